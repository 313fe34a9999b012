//! Hosted sampling daemon for a Raspberry-Pi-class board.
//!
//! Verifies every external resource it touches, configures the sensor
//! suite over the shared bus, then prints one sample block per interval.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::process;
use std::thread;
use std::time::Duration;

use chloris::onewire;
use chloris::{
    AmbientConfig, AmbientLight, BusHandle, SoilProbe, Spectrometer, SpectrometerConfig,
};
use linux_embedded_hal::{Delay, I2cdev};

const I2C_BUS: &str = "/dev/i2c-1";
const ONE_WIRE_ROOT: &str = "/sys/bus/w1/devices";
const DATA_LOG: &str = "/var/log/chloris-data.dmp";
const SAMPLE_INTERVAL: Duration = Duration::from_secs(5);
// Configuration must be retried from scratch after a failed sequence.
const CONFIGURE_ATTEMPTS: u32 = 4;

// Exit codes, one per failure class.
const EXIT_SELF_TEST: i32 = 1;
const EXIT_SOIL_FAULT: i32 = 244;
const EXIT_SPECTROMETER_FAULT: i32 = 245;

fn main() {
    println!("chloris starting on {}", std::env::consts::OS);
    if !self_test() {
        eprintln!("errors were encountered during self test, refusing to proceed");
        process::exit(EXIT_SELF_TEST);
    }

    let i2c = match I2cdev::new(I2C_BUS) {
        Ok(device) => device,
        Err(err) => {
            eprintln!("failed to open {I2C_BUS}: {err:?}");
            process::exit(EXIT_SELF_TEST);
        }
    };
    let bus = BusHandle::new(i2c);
    let mut delay = Delay;

    let mut ambient = AmbientLight::new(&bus, AmbientConfig::default());
    let mut soil = SoilProbe::new(&bus);
    let mut spectrometer = Spectrometer::new(&bus, SpectrometerConfig::default());

    ambient.configure(&mut delay);
    let mut spectral = false;
    for _ in 0..CONFIGURE_ATTEMPTS {
        if spectrometer.configure().is_ok() {
            spectral = true;
            break;
        }
    }
    if !spectral {
        eprintln!("spectrometer configuration failed, continuing without spectral data");
    }

    loop {
        thread::sleep(SAMPLE_INTERVAL);

        let moisture = soil.moisture(&mut delay).unwrap_or_else(|err| {
            eprintln!("soil moisture read failed: {err}");
            process::exit(EXIT_SOIL_FAULT);
        });
        let soil_temperature = soil.temperature(&mut delay).unwrap_or_else(|err| {
            eprintln!("soil temperature read failed: {err}");
            process::exit(EXIT_SOIL_FAULT);
        });
        let white = ambient.white_light().unwrap_or_else(|err| {
            eprintln!("white light read failed: {err}");
            0
        });

        println!("soil moisture: {moisture}\tsoil temperature: {soil_temperature:.2} C");
        match one_wire_temperature() {
            Some(celsius) => println!("air temperature: {celsius:.3} C"),
            None => eprintln!("could not read one-wire temperature"),
        }
        println!("white light: {white}");

        if spectral {
            match spectrometer.photon_flux(&mut delay) {
                Ok(flux) => println!("photon flux: {flux:?}"),
                Err(err) => {
                    eprintln!("spectral measurement failed: {err}");
                    if spectrometer.disable().is_err() {
                        eprintln!("spectrometer power off failed, goodbye");
                        process::exit(EXIT_SPECTROMETER_FAULT);
                    }
                    spectral = false;
                }
            }
        }
    }
}

/// Power-on self-test: every external resource the daemon touches must be
/// present before sampling starts.
fn self_test() -> bool {
    let i2c = Path::new(I2C_BUS).exists();
    println!("i2c bus present: {i2c}");
    let one_wire = Path::new(ONE_WIRE_ROOT).is_dir();
    println!("one-wire bus present: {one_wire}");
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(DATA_LOG)
        .is_ok();
    println!("data log writable: {log}");
    i2c && one_wire && log
}

/// Reads the first probe report found under the one-wire root.
fn one_wire_temperature() -> Option<f64> {
    for entry in fs::read_dir(ONE_WIRE_ROOT).ok()?.flatten() {
        let report_path = entry.path().join("w1_slave");
        if let Ok(report) = fs::read_to_string(&report_path) {
            return onewire::parse_temperature(&report);
        }
    }
    None
}
