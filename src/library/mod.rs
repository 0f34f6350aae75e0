//! Activity library
//!
//! The static, read-only table of per-activity-name parameters the
//! samplers draw from: CRP group concentrations, role distributions,
//! GP kernel parameters, per-role Markov chains, and spatial-target
//! flags. Loaded once (see [`load`]) or built programmatically through
//! [`LibraryBuilder`]; never mutated during sampling.

pub mod load;

pub use load::load_dir;

use std::collections::{HashMap, HashSet};

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::errors::{LoadError, ModelError};

/// Squared-exponential kernel parameters for one activity name.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KernelParams {
    /// Length scale in frames
    pub scale: f64,
    /// Signal standard deviation
    pub sigma: f64,
}

/// Discrete-time Markov chain over a role's activity vocabulary.
#[derive(Debug, Clone)]
pub struct MarkovChain {
    /// Activity name per state index
    pub labels: Vec<String>,
    /// Initial distribution over states
    pub initial: DVector<f64>,
    /// Row-stochastic transition matrix
    pub transition: DMatrix<f64>,
}

/// Read-only per-activity-name parameter tables.
#[derive(Debug, Clone)]
pub struct ActivityLibrary {
    activities: Vec<String>,
    intentional: HashSet<String>,
    physical: HashSet<String>,
    roles: Vec<String>,
    concentration: HashMap<String, f64>,
    role_dist: HashMap<String, DVector<f64>>,
    kernels: HashMap<String, KernelParams>,
    chains: HashMap<String, MarkovChain>,
    targets: HashSet<String>,
}

impl ActivityLibrary {
    /// Start building a library programmatically
    pub fn builder() -> LibraryBuilder {
        LibraryBuilder::default()
    }

    /// All activity names, in declaration order
    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    /// All role names, in declaration order
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// True when `name` is a known intentional activity
    pub fn is_intentional(&self, name: &str) -> bool {
        self.intentional.contains(name)
    }

    /// True when `name` is a known physical activity
    pub fn is_physical(&self, name: &str) -> bool {
        self.physical.contains(name)
    }

    /// CRP group concentration for an intentional activity
    pub fn concentration(&self, name: &str) -> Result<f64, ModelError> {
        self.concentration
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownName {
                kind: "activity",
                name: name.to_string(),
            })
    }

    /// Role distribution for an intentional activity (indexed like `roles()`)
    pub fn role_distribution(&self, name: &str) -> Result<&DVector<f64>, ModelError> {
        self.role_dist.get(name).ok_or_else(|| ModelError::UnknownName {
            kind: "activity",
            name: name.to_string(),
        })
    }

    /// GP kernel parameters for a physical activity
    pub fn kernel(&self, name: &str) -> Result<KernelParams, ModelError> {
        self.kernels
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownName {
                kind: "activity",
                name: name.to_string(),
            })
    }

    /// Markov chain for a role
    pub fn chain(&self, role: &str) -> Result<&MarkovChain, ModelError> {
        self.chains.get(role).ok_or_else(|| ModelError::UnknownName {
            kind: "role",
            name: role.to_string(),
        })
    }

    /// True when the activity declares an explicit spatial target
    pub fn has_target(&self, name: &str) -> bool {
        self.targets.contains(name)
    }

    /// Index of a role name
    pub fn role_index(&self, role: &str) -> Result<usize, ModelError> {
        self.roles
            .iter()
            .position(|r| r == role)
            .ok_or_else(|| ModelError::UnknownName {
                kind: "role",
                name: role.to_string(),
            })
    }

    /// Role name at an index
    pub fn role_name(&self, index: usize) -> Result<&str, ModelError> {
        self.roles
            .get(index)
            .map(|s| s.as_str())
            .ok_or_else(|| ModelError::UnknownName {
                kind: "role index",
                name: index.to_string(),
            })
    }
}

/// Whether a declared activity decomposes further or is a leaf primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// Branch: decomposes via association + sequences
    Intentional,
    /// Leaf: carries a concrete trajectory
    Physical,
}

/// Builder with validation for [`ActivityLibrary`].
#[derive(Debug, Default)]
pub struct LibraryBuilder {
    activities: Vec<(String, ActivityKind)>,
    roles: Vec<String>,
    concentration: HashMap<String, f64>,
    role_dist: HashMap<String, Vec<f64>>,
    kernels: HashMap<String, KernelParams>,
    chains: HashMap<String, MarkovChain>,
    targets: HashSet<String>,
}

const DIST_TOLERANCE: f64 = 1e-6;

impl LibraryBuilder {
    /// Declare an activity name
    pub fn activity(mut self, name: impl Into<String>, kind: ActivityKind) -> Self {
        self.activities.push((name.into(), kind));
        self
    }

    /// Declare a role name
    pub fn role(mut self, name: impl Into<String>) -> Self {
        self.roles.push(name.into());
        self
    }

    /// CRP concentration for an intentional activity
    pub fn concentration(mut self, activity: impl Into<String>, alpha: f64) -> Self {
        self.concentration.insert(activity.into(), alpha);
        self
    }

    /// Role distribution for an intentional activity (one weight per declared role)
    pub fn role_distribution(mut self, activity: impl Into<String>, dist: Vec<f64>) -> Self {
        self.role_dist.insert(activity.into(), dist);
        self
    }

    /// GP kernel parameters for a physical activity
    pub fn kernel(mut self, activity: impl Into<String>, scale: f64, sigma: f64) -> Self {
        self.kernels
            .insert(activity.into(), KernelParams { scale, sigma });
        self
    }

    /// Markov chain for a role
    pub fn chain(
        mut self,
        role: impl Into<String>,
        labels: Vec<String>,
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
    ) -> Self {
        let n = labels.len();
        let flat: Vec<f64> = transition.into_iter().flatten().collect();
        self.chains.insert(
            role.into(),
            MarkovChain {
                labels,
                initial: DVector::from_vec(initial),
                transition: DMatrix::from_row_slice(n, flat.len() / n.max(1), &flat),
            },
        );
        self
    }

    /// Flag an intentional activity as having an explicit spatial target
    pub fn target(mut self, activity: impl Into<String>) -> Self {
        self.targets.insert(activity.into());
        self
    }

    /// Validate and build the library
    pub fn build(self) -> Result<ActivityLibrary, LoadError> {
        if self.activities.is_empty() {
            return Err(LoadError::Invalid {
                description: "library declares no activities".to_string(),
            });
        }

        let mut names = Vec::new();
        let mut intentional = HashSet::new();
        let mut physical = HashSet::new();
        for (name, kind) in &self.activities {
            if names.contains(name) {
                return Err(LoadError::Invalid {
                    description: format!("duplicate activity name {:?}", name),
                });
            }
            names.push(name.clone());
            match kind {
                ActivityKind::Intentional => intentional.insert(name.clone()),
                ActivityKind::Physical => physical.insert(name.clone()),
            };
        }

        for name in &intentional {
            let alpha = self.concentration.get(name).ok_or_else(|| LoadError::Invalid {
                description: format!("intentional activity {:?} has no concentration", name),
            })?;
            if *alpha <= 0.0 {
                return Err(LoadError::Invalid {
                    description: format!("concentration for {:?} must be positive", name),
                });
            }
            let dist = self.role_dist.get(name).ok_or_else(|| LoadError::Invalid {
                description: format!("intentional activity {:?} has no role distribution", name),
            })?;
            if dist.len() != self.roles.len() {
                return Err(LoadError::Invalid {
                    description: format!(
                        "role distribution for {:?} has {} entries, expected {}",
                        name,
                        dist.len(),
                        self.roles.len()
                    ),
                });
            }
            let sum: f64 = dist.iter().sum();
            if (sum - 1.0).abs() > DIST_TOLERANCE {
                return Err(LoadError::Invalid {
                    description: format!("role distribution for {:?} sums to {}", name, sum),
                });
            }
        }

        for name in &physical {
            let kernel = self.kernels.get(name).ok_or_else(|| LoadError::Invalid {
                description: format!("physical activity {:?} has no kernel", name),
            })?;
            if kernel.scale <= 0.0 || kernel.sigma <= 0.0 {
                return Err(LoadError::Invalid {
                    description: format!("kernel for {:?} must have positive scale and sigma", name),
                });
            }
        }

        for role in &self.roles {
            let chain = self.chains.get(role).ok_or_else(|| LoadError::Invalid {
                description: format!("role {:?} has no Markov chain", role),
            })?;
            let n = chain.labels.len();
            if n == 0 {
                return Err(LoadError::Invalid {
                    description: format!("chain for role {:?} has no states", role),
                });
            }
            for label in &chain.labels {
                if !names.contains(label) {
                    return Err(LoadError::Invalid {
                        description: format!(
                            "chain for role {:?} references unknown activity {:?}",
                            role, label
                        ),
                    });
                }
            }
            if chain.initial.len() != n {
                return Err(LoadError::Invalid {
                    description: format!("initial distribution for role {:?} has wrong length", role),
                });
            }
            if (chain.initial.sum() - 1.0).abs() > DIST_TOLERANCE {
                return Err(LoadError::Invalid {
                    description: format!("initial distribution for role {:?} is not normalized", role),
                });
            }
            if chain.transition.nrows() != n || chain.transition.ncols() != n {
                return Err(LoadError::Invalid {
                    description: format!("transition matrix for role {:?} is not {}x{}", role, n, n),
                });
            }
            for row in 0..n {
                let sum: f64 = chain.transition.row(row).iter().sum();
                if (sum - 1.0).abs() > DIST_TOLERANCE {
                    return Err(LoadError::Invalid {
                        description: format!(
                            "transition row {} for role {:?} sums to {}",
                            row, role, sum
                        ),
                    });
                }
            }
        }

        for target in &self.targets {
            if !intentional.contains(target) {
                return Err(LoadError::Invalid {
                    description: format!("target flag on non-intentional activity {:?}", target),
                });
            }
        }

        Ok(ActivityLibrary {
            activities: names,
            intentional,
            physical,
            roles: self.roles,
            concentration: self.concentration,
            role_dist: self
                .role_dist
                .into_iter()
                .map(|(k, v)| (k, DVector::from_vec(v)))
                .collect(),
            kernels: self.kernels,
            chains: self.chains,
            targets: self.targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> LibraryBuilder {
        ActivityLibrary::builder()
            .activity("FFA", ActivityKind::Intentional)
            .activity("WALK", ActivityKind::Physical)
            .activity("STAND", ActivityKind::Physical)
            .role("ACTOR")
            .concentration("FFA", 1.0)
            .role_distribution("FFA", vec![1.0])
            .kernel("WALK", 10.0, 1.0)
            .kernel("STAND", 5.0, 0.5)
            .chain(
                "ACTOR",
                vec!["WALK".to_string(), "STAND".to_string()],
                vec![0.5, 0.5],
                vec![vec![0.9, 0.1], vec![0.1, 0.9]],
            )
    }

    #[test]
    fn test_build_and_lookup() {
        let lib = minimal().build().unwrap();
        assert!(lib.is_intentional("FFA"));
        assert!(lib.is_physical("WALK"));
        assert_eq!(lib.concentration("FFA").unwrap(), 1.0);
        assert_eq!(lib.kernel("WALK").unwrap().scale, 10.0);
        assert_eq!(lib.chain("ACTOR").unwrap().labels.len(), 2);
        assert_eq!(lib.role_index("ACTOR").unwrap(), 0);
        assert!(!lib.has_target("FFA"));
    }

    #[test]
    fn test_unknown_name_errors() {
        let lib = minimal().build().unwrap();
        assert!(matches!(
            lib.concentration("JUGGLE").unwrap_err(),
            ModelError::UnknownName { .. }
        ));
        assert!(matches!(
            lib.chain("BYSTANDER").unwrap_err(),
            ModelError::UnknownName { .. }
        ));
    }

    #[test]
    fn test_build_rejects_missing_kernel() {
        let err = ActivityLibrary::builder()
            .activity("FFA", ActivityKind::Intentional)
            .activity("WALK", ActivityKind::Physical)
            .role("ACTOR")
            .concentration("FFA", 1.0)
            .role_distribution("FFA", vec![1.0])
            .chain(
                "ACTOR",
                vec!["WALK".to_string()],
                vec![1.0],
                vec![vec![1.0]],
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("kernel"));
    }

    #[test]
    fn test_build_rejects_non_stochastic_row() {
        let err = minimal()
            .chain(
                "ACTOR",
                vec!["WALK".to_string(), "STAND".to_string()],
                vec![0.5, 0.5],
                vec![vec![0.9, 0.3], vec![0.1, 0.9]],
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("transition row"));
    }

    #[test]
    fn test_build_rejects_target_on_physical() {
        let err = minimal().target("WALK").build().unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn test_build_rejects_unnormalized_role_dist() {
        let err = minimal()
            .role_distribution("FFA", vec![0.6])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("sums to"));
    }
}
