// Storage - One save slot per simulation name
// Full snapshots written with write-to-temp-then-rename

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::integrator::Integrator;
use crate::physics_engine::{IntegratorConfig, NBodyEngine};
use crate::simulation::Simulation;

/// Bumped whenever the saved layout changes incompatibly
pub const FORMAT_VERSION: u32 = 1;

const SLOT_FILE: &str = "sim.json";
const TEMP_FILE: &str = "sim.json.tmp";

#[derive(Serialize)]
struct SavedSimulationRef<'a, E> {
    format_version: u32,
    saved_at: DateTime<Utc>,
    simulation: &'a Simulation<E>,
}

#[derive(Deserialize)]
struct SavedSimulation<E> {
    simulation: Simulation<E>,
}

/// Minimal view used to check the version before decoding the body
#[derive(Deserialize)]
struct SavedHeader {
    format_version: u32,
}

#[derive(Debug, Clone)]
pub struct SimulationStore {
    root: PathBuf,
}

impl SimulationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Slot file for `name`; `None` for the unnamed simulation.
    pub fn location(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        Some(self.root.join(name).join(SLOT_FILE))
    }

    pub fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.location(name).is_some_and(|path| path.is_file())
    }

    /// Create an empty named simulation and persist it immediately.
    pub fn create(&self, name: &str, config: IntegratorConfig) -> SimResult<Simulation> {
        check_name(name)?;
        let simulation = Simulation::with_config(name, config);
        self.save(&simulation)?;
        info!(simulation = name, "created simulation");
        Ok(simulation)
    }

    pub fn save<E: Integrator>(&self, simulation: &Simulation<E>) -> SimResult<()> {
        check_name(simulation.name())?;
        let path = self.location(simulation.name()).ok_or(SimError::NoName)?;
        let dir = self.root.join(simulation.name());
        fs::create_dir_all(&dir)?;

        let temp_path = dir.join(TEMP_FILE);
        let saved = SavedSimulationRef {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            simulation,
        };

        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &saved)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        info!(
            simulation = simulation.name(),
            time = simulation.time(),
            bodies = simulation.len(),
            "saved simulation"
        );
        Ok(())
    }

    pub fn load(&self, name: &str) -> SimResult<Simulation> {
        self.load_as::<NBodyEngine>(name)
    }

    /// Load a simulation driven by a specific engine type.
    pub fn load_as<E: Integrator>(&self, name: &str) -> SimResult<Simulation<E>> {
        check_name(name)?;
        let path = self.location(name).ok_or(SimError::NoName)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(SimError::NotFound {
                    name: name.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        let header: SavedHeader = serde_json::from_slice(&bytes)?;
        if header.format_version != FORMAT_VERSION {
            return Err(SimError::UnsupportedFormat {
                found: header.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let saved: SavedSimulation<E> = serde_json::from_slice(&bytes)?;
        let simulation = saved.simulation;
        if simulation.name() != name {
            warn!(
                requested = name,
                stored = simulation.name(),
                "loaded slot holds a differently named simulation"
            );
        }

        info!(
            simulation = name,
            time = simulation.time(),
            bodies = simulation.len(),
            "loaded simulation"
        );
        Ok(simulation)
    }

    /// Names of all saved simulations, sorted.
    pub fn list(&self) -> SimResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().join(SLOT_FILE).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A name must map to exactly one directory directly under the root.
fn check_name(name: &str) -> SimResult<()> {
    if name.is_empty() {
        return Err(SimError::NoName);
    }
    let invalid = name == "."
        || name == ".."
        || name.trim() != name
        || name.chars().any(|c| c == '/' || c == '\\' || c.is_control());
    if invalid {
        return Err(SimError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_engine::{OrbitalElements, Vector3, MASS_EARTH, MASS_SUN};
    use crate::simulation::PartialState;
    use tempfile::tempdir;

    fn populated(name: &str) -> Simulation {
        let mut sim = Simulation::new(name);
        sim.add_primary(MASS_SUN, "sun").unwrap();
        sim.add_body_from_elements(
            MASS_EARTH,
            "earth",
            &OrbitalElements::new(365.25 * 86400.0, 0.0167, 0.3),
        )
        .unwrap();
        sim.add_body(
            0.1,
            "probe",
            &PartialState::from_vectors(
                Vector3::new(1.0e11 / 3.0, 0.1, -7.7e-3),
                Vector3::new(0.0, 2.9e4 / 7.0, 1.0 / 3.0),
            ),
        )
        .unwrap();
        sim.integrate(12345.678).unwrap();
        sim
    }

    #[test]
    fn test_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path());
        let sim = populated("n");

        store.save(&sim).unwrap();
        let loaded = store.load("n").unwrap();

        assert_eq!(loaded.time().to_bits(), sim.time().to_bits());
        assert_eq!(loaded, sim);
        assert_eq!(loaded.registry(), sim.registry());
        assert_eq!(loaded.primary(), sim.primary());
        for (a, b) in loaded.engine().bodies().iter().zip(sim.engine().bodies()) {
            assert_eq!(a.handle, b.handle);
            assert_eq!(a.mass.to_bits(), b.mass.to_bits());
            assert_eq!(a.state.position.x.to_bits(), b.state.position.x.to_bits());
            assert_eq!(a.state.velocity.z.to_bits(), b.state.velocity.z.to_bits());
        }
    }

    #[test]
    fn test_loaded_simulation_keeps_evolving_identically() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path());
        let mut sim = populated("n");
        store.save(&sim).unwrap();

        let mut loaded = store.load("n").unwrap();
        let a = sim.integrate(86400.0).unwrap();
        let b = loaded.integrate(86400.0).unwrap();
        assert_eq!(a, b);

        // New handles continue from where the saved engine stopped
        let handle = loaded.add_body(1.0, "late", &PartialState::default()).unwrap();
        assert!(sim.engine().bodies().iter().all(|body| body.handle != handle));
    }

    #[test]
    fn test_save_unnamed_fails() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path());
        assert!(matches!(
            store.save(&Simulation::new("")),
            Err(SimError::NoName)
        ));
        assert!(store.location("").is_none());
    }

    #[test]
    fn test_names_escaping_root_rejected() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path().join("root"));
        for name in ["..", ".", "a/b", "a\\b", " padded"] {
            assert!(
                matches!(
                    store.create(name, IntegratorConfig::default()),
                    Err(SimError::InvalidName { .. })
                ),
                "{name}"
            );
            assert!(!store.exists(name));
        }
        assert!(!dir.path().join("root").exists());
    }

    #[test]
    fn test_created_simulation_uses_config() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path());
        let config = IntegratorConfig {
            dt: 60.0,
            ..IntegratorConfig::default()
        };
        store.create("fine", config).unwrap();
        assert_eq!(store.load("fine").unwrap().engine().config.dt, 60.0);
    }

    #[test]
    fn test_load_missing_fails() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path());
        assert!(matches!(
            store.load("ghost"),
            Err(SimError::NotFound { ref name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path());
        let mut sim = store.create("n", IntegratorConfig::default()).unwrap();
        assert!(store.exists("n"));

        sim.add_primary(1.0, "sun").unwrap();
        store.save(&sim).unwrap();

        assert!(!dir.path().join("n").join(TEMP_FILE).exists());
        assert_eq!(store.load("n").unwrap().len(), 1);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path());
        store.create("old", IntegratorConfig::default()).unwrap();

        let path = store.location("old").unwrap();
        let mut value: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        value["format_version"] = serde_json::json!(99);
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        assert!(matches!(
            store.load("old"),
            Err(SimError::UnsupportedFormat { found: 99, .. })
        ));
    }

    #[test]
    fn test_list_saved_simulations() {
        let dir = tempdir().unwrap();
        let store = SimulationStore::new(dir.path().join("missing"));
        assert!(store.list().unwrap().is_empty());

        let store = SimulationStore::new(dir.path());
        store.create("beta", IntegratorConfig::default()).unwrap();
        store.create("alpha", IntegratorConfig::default()).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);
    }
}
