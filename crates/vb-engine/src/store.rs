//! Validated option storage

use crate::rules::rule;
use std::collections::HashMap;
use vb_core::{Opt, OptionError};

/// Current value of every option and sub-target
#[derive(Debug, Clone)]
pub struct OptionStore {
    values: HashMap<Opt, Vec<i64>>,
}

impl Default for OptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionStore {
    /// Store holding every option's power-up default
    pub fn new() -> Self {
        let mut values = HashMap::with_capacity(Opt::ALL.len());
        for &opt in Opt::ALL {
            values.insert(opt, vec![rule(opt).default; opt.scope().targets()]);
        }

        // df0 is built in
        if let Some(connected) = values.get_mut(&Opt::DriveConnect) {
            connected[0] = 1;
        }

        Self { values }
    }

    /// Value of one sub-target (index 0 for global options)
    pub fn get(&self, opt: Opt, index: usize) -> Option<i64> {
        self.values.get(&opt)?.get(index).copied()
    }

    /// Validate a change and return the sub-targets it addresses
    ///
    /// `index` is `None` for a machine-wide change, which addresses every
    /// sub-target of a per-target option.
    pub fn check(
        &self,
        opt: Opt,
        index: Option<i64>,
        value: i64,
        powered_on: bool,
    ) -> Result<Vec<usize>, OptionError> {
        let scope = opt.scope();
        let targets: Vec<usize> = match index {
            None => (0..scope.targets()).collect(),
            Some(_) if !opt.is_indexed() => return Err(OptionError::NotIndexed(opt)),
            Some(i) if !scope.contains(i) => {
                return Err(OptionError::InvalidIndex { option: opt, index: i })
            }
            Some(i) => vec![i as usize],
        };

        let rule = rule(opt);
        if rule.locked && powered_on {
            return Err(OptionError::Locked(opt));
        }
        if !rule.domain.accepts(value) {
            return Err(OptionError::InvalidArgument { option: opt, value });
        }
        if opt == Opt::DriveConnect && value == 0 && targets.contains(&0) {
            return Err(OptionError::InvalidArgument { option: opt, value });
        }

        Ok(targets)
    }

    /// Write a previously checked change, returning the targets that changed
    pub fn commit(&mut self, opt: Opt, targets: &[usize], value: i64) -> Vec<usize> {
        let Some(slots) = self.values.get_mut(&opt) else {
            return Vec::new();
        };
        targets
            .iter()
            .copied()
            .filter(|&t| {
                let changed = slots[t] != value;
                slots[t] = value;
                changed
            })
            .collect()
    }
}
