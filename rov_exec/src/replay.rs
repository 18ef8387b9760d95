//! # Recorded drive replay
//!
//! Reads a recorded drive, a directory holding a semicolon delimited `robot_log.csv` and the
//! camera frames it refers to, so the control loop can be run offline. The recording does not
//! react to the demands the loop produces, so a replay exercises perception and decision making
//! only.
//!
//! The tick by tick decisions can be archived to a CSV file with [`TickArchiver`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Writer, WriterBuilder};
use image::RgbImage;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{
    nav::NavMode,
    rover_state::{ActuatorDemands, Telemetry},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the telemetry log inside a recording directory
pub const LOG_FILE_NAME: &str = "robot_log.csv";

/// Name of the frame directory inside a recording directory
pub const IMG_DIR_NAME: &str = "IMG";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One row of the recorded telemetry log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    #[serde(rename = "Path")]
    pub path: String,

    #[serde(rename = "SteerAngle")]
    pub steer: f64,

    #[serde(rename = "Throttle")]
    pub throttle: f64,

    #[serde(rename = "Brake")]
    pub brake: f64,

    #[serde(rename = "Speed")]
    pub speed: f64,

    #[serde(rename = "X_Position")]
    pub x: f64,

    #[serde(rename = "Y_Position")]
    pub y: f64,

    #[serde(rename = "Pitch")]
    pub pitch: f64,

    #[serde(rename = "Yaw")]
    pub yaw: f64,

    #[serde(rename = "Roll")]
    pub roll: f64,
}

/// A loaded recording.
#[derive(Debug, Clone)]
pub struct Replay {
    dir: PathBuf,
    records: Vec<ReplayRecord>,
}

/// Writes one CSV row per control tick.
pub struct TickArchiver {
    writer: Writer<File>,
}

/// One row of the tick archive.
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub mode: NavMode,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub throttle: f64,
    pub steer: f64,
    pub brake: f64,
    pub send_pickup: bool,
    pub samples_collected: u32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Could not access {0:?}: {1}")]
    IoError(PathBuf, std::io::Error),

    #[error("Could not parse the telemetry log: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Could not load frame {0:?}: {1}")]
    ImageError(PathBuf, image::ImageError),

    #[error("The telemetry log contains no records")]
    Empty,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ReplayRecord {
    /// Telemetry for the tick this record describes.
    ///
    /// The recording carries no pickup flags, so they are always false.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            pos: Point2::new(self.x, self.y),
            yaw: self.yaw,
            pitch: self.pitch,
            roll: self.roll,
            vel: self.speed,
            picking_up: false,
            near_sample: false,
        }
    }
}

impl Replay {
    /// Load the telemetry log of the recording in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, ReplayError> {
        let dir = dir.as_ref().to_path_buf();
        let log_path = dir.join(LOG_FILE_NAME);

        let file = File::open(&log_path).map_err(|e| ReplayError::IoError(log_path.clone(), e))?;

        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(file);

        let records = reader
            .deserialize()
            .collect::<Result<Vec<ReplayRecord>, csv::Error>>()?;

        if records.is_empty() {
            return Err(ReplayError::Empty);
        }

        Ok(Self { dir, records })
    }

    pub fn records(&self) -> &[ReplayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve the frame a record refers to.
    ///
    /// Recordings are often moved after capture, so the path is tried relative to the recording
    /// directory first and then as a bare file name inside its `IMG` directory.
    pub fn frame_path(&self, record: &ReplayRecord) -> PathBuf {
        let recorded = PathBuf::from(record.path.replace('\\', "/"));
        let direct = self.dir.join(&recorded);

        if direct.exists() {
            return direct;
        }

        match recorded.file_name() {
            Some(name) => self.dir.join(IMG_DIR_NAME).join(name),
            None => direct,
        }
    }

    /// Load the frame a record refers to.
    pub fn load_frame(&self, record: &ReplayRecord) -> Result<RgbImage, ReplayError> {
        let path = self.frame_path(record);

        image::open(&path)
            .map(|img| img.to_rgb8())
            .map_err(|e| ReplayError::ImageError(path, e))
    }
}

impl TickArchiver {
    /// Create a new archive at `path`, overwriting any existing file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ReplayError::IoError(path.to_path_buf(), e))?;

        Ok(Self {
            writer: WriterBuilder::new().has_headers(true).from_writer(file),
        })
    }

    pub fn write(&mut self, record: &TickRecord) -> Result<(), ReplayError> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer
            .flush()
            .map_err(|e| ReplayError::IoError(PathBuf::from("tick archive"), e))
    }
}

impl TickRecord {
    pub fn new(
        tick: u64,
        mode: NavMode,
        telem: &Telemetry,
        dems: &ActuatorDemands,
        samples: u32,
    ) -> Self {
        Self {
            tick,
            mode,
            x: telem.pos.x,
            y: telem.pos.y,
            yaw: telem.yaw,
            throttle: dems.throttle,
            steer: dems.steer,
            brake: dems.brake,
            send_pickup: dems.send_pickup,
            samples_collected: samples,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgb;
    use std::fs;

    /// Create a fresh directory under the system temp directory.
    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rov_exec_replay_{}_{}",
            name,
            std::process::id()
        ));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(dir.join(IMG_DIR_NAME)).unwrap();
        dir
    }

    const HEADER: &str = "Path;SteerAngle;Throttle;Brake;Speed;X_Position;Y_Position;Pitch;Yaw;Roll\n";

    #[test]
    fn test_open_and_load() {
        let dir = temp_dir("open");

        let log = format!(
            "{}{}{}",
            HEADER,
            "/home/someone/recording/IMG/frame_0.png;0;0.2;0;0.5;99.66999;85.58897;0.0002;56.82;359.99\n",
            "IMG/frame_1.png;-15;0;10;1.1;100.1;86.0;1.5;57.0;0.5\n"
        );
        fs::write(dir.join(LOG_FILE_NAME), log).unwrap();

        let img = RgbImage::from_pixel(320, 160, Rgb([10, 20, 30]));
        img.save(dir.join(IMG_DIR_NAME).join("frame_0.png")).unwrap();
        img.save(dir.join(IMG_DIR_NAME).join("frame_1.png")).unwrap();

        let replay = Replay::open(&dir).unwrap();
        assert_eq!(replay.len(), 2);

        let r0 = &replay.records()[0];
        let t0 = r0.telemetry();
        assert_eq!(t0.pos, Point2::new(99.66999, 85.58897));
        assert_eq!(t0.yaw, 56.82);
        assert_eq!(t0.roll, 359.99);
        assert_eq!(t0.vel, 0.5);

        // Absolute path from another machine falls back to the IMG directory
        assert_eq!(
            replay.frame_path(r0),
            dir.join(IMG_DIR_NAME).join("frame_0.png")
        );

        for r in replay.records() {
            let frame = replay.load_frame(r).unwrap();
            assert_eq!(frame.dimensions(), (320, 160));
            assert_eq!(frame.get_pixel(5, 5), &Rgb([10, 20, 30]));
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_errors() {
        let dir = temp_dir("errors");

        // No log
        assert!(matches!(Replay::open(&dir), Err(ReplayError::IoError(..))));

        // Header only
        fs::write(dir.join(LOG_FILE_NAME), HEADER).unwrap();
        assert!(matches!(Replay::open(&dir), Err(ReplayError::Empty)));

        // Missing column
        fs::write(
            dir.join(LOG_FILE_NAME),
            "Path;SteerAngle\nIMG/a.png;0\n",
        )
        .unwrap();
        assert!(matches!(Replay::open(&dir), Err(ReplayError::CsvError(_))));

        // Missing frame
        fs::write(
            dir.join(LOG_FILE_NAME),
            format!("{}IMG/missing.png;0;0;0;0;1;1;0;0;0\n", HEADER),
        )
        .unwrap();
        let replay = Replay::open(&dir).unwrap();
        assert!(matches!(
            replay.load_frame(&replay.records()[0]),
            Err(ReplayError::ImageError(..))
        ));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_tick_archive() {
        let dir = temp_dir("archive");
        let path = dir.join("ticks.csv");

        let mut arch = TickArchiver::create(&path).unwrap();
        let telem = Telemetry::default();
        let dems = ActuatorDemands {
            throttle: 0.2,
            ..ActuatorDemands::default()
        };
        arch.write(&TickRecord::new(1, NavMode::Start, &telem, &dems, 0))
            .unwrap();
        arch.write(&TickRecord::new(2, NavMode::Travel, &telem, &dems, 0))
            .unwrap();
        arch.flush().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("tick,mode,"));
        assert!(lines[2].starts_with("2,travel,"));

        fs::remove_dir_all(&dir).ok();
    }
}
