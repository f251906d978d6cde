//! OpenCV Haar cascade backend.
//!
//! Loads the stock frontal-face and eye cascades shipped with OpenCV. Faces
//! are searched with the configured scale factor and neighbour count, eyes
//! with OpenCV's defaults inside each face crop.

use crate::config::DetectorConfig;
use crate::error::DetectorError;
use image::GrayImage;
use opencv::{core, objdetect, prelude::*};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{Region, RegionClassifier};

const EYE_SCALE_FACTOR: f64 = 1.1;
const EYE_MIN_NEIGHBORS: i32 = 3;

pub struct HaarCascadeClassifier {
    // detectMultiScale mutates internal buffers, one caller at a time
    face_cascade: Mutex<objdetect::CascadeClassifier>,
    eye_cascade: Mutex<objdetect::CascadeClassifier>,
    scale_factor: f64,
    min_neighbors: i32,
}

impl HaarCascadeClassifier {
    pub fn load(config: &DetectorConfig) -> Result<Self, DetectorError> {
        info!(
            "Loading Haar cascades: face={}, eye={}",
            config.face_cascade_path, config.eye_cascade_path
        );

        let face_cascade = load_cascade(&config.face_cascade_path)?;
        let eye_cascade = load_cascade(&config.eye_cascade_path)?;

        Ok(Self {
            face_cascade: Mutex::new(face_cascade),
            eye_cascade: Mutex::new(eye_cascade),
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
        })
    }
}

fn load_cascade(path: &str) -> Result<objdetect::CascadeClassifier, DetectorError> {
    let cascade =
        objdetect::CascadeClassifier::new(path).map_err(|e| DetectorError::CascadeLoad {
            path: path.to_string(),
            details: e.to_string(),
        })?;

    let empty = cascade.empty().map_err(|e| DetectorError::CascadeLoad {
        path: path.to_string(),
        details: e.to_string(),
    })?;
    if empty {
        return Err(DetectorError::CascadeLoad {
            path: path.to_string(),
            details: "no cascade stages loaded".to_string(),
        });
    }

    Ok(cascade)
}

fn classifier_error(e: opencv::Error) -> DetectorError {
    DetectorError::Classifier {
        details: e.to_string(),
    }
}

fn gray_to_mat(gray: &GrayImage) -> opencv::Result<core::Mat> {
    let flat = core::Mat::from_slice(gray.as_raw())?;
    let shaped = flat.reshape(1, gray.height() as i32)?;
    shaped.try_clone()
}

fn run_cascade(
    cascade: &Mutex<objdetect::CascadeClassifier>,
    gray: &GrayImage,
    scale_factor: f64,
    min_neighbors: i32,
) -> Result<Vec<Region>, DetectorError> {
    let mat = gray_to_mat(gray).map_err(classifier_error)?;
    let mut found = core::Vector::<core::Rect>::new();

    cascade
        .lock()
        .detect_multi_scale(
            &mat,
            &mut found,
            scale_factor,
            min_neighbors,
            0,
            core::Size::new(0, 0),
            core::Size::new(0, 0),
        )
        .map_err(classifier_error)?;

    Ok(found
        .iter()
        .filter_map(|rect| Region::from_signed(rect.x, rect.y, rect.width, rect.height))
        .collect())
}

impl RegionClassifier for HaarCascadeClassifier {
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<Region>, DetectorError> {
        let faces = run_cascade(
            &self.face_cascade,
            gray,
            self.scale_factor,
            self.min_neighbors,
        )?;
        debug!("Haar face cascade found {} candidates", faces.len());
        Ok(faces)
    }

    fn detect_eyes(&self, face: &GrayImage) -> Result<Vec<Region>, DetectorError> {
        run_cascade(&self.eye_cascade, face, EYE_SCALE_FACTOR, EYE_MIN_NEIGHBORS)
    }
}
