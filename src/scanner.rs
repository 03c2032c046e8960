//! Dimension/variable scanner: walks an open backend and determines which
//! variables are dimensioned by the locations axis, and the axis sizes a
//! legacy (no-`nrecs`) file implies.

use std::collections::BTreeMap;

use crate::backend::Backend;
use crate::err_at;
use crate::Result;

/// Output of a scan: the coordinate variables and each variable's ordered
/// dimension names, plus the axis size a legacy file's locations count
/// resolves to.
#[derive(Clone, Debug, Default)]
pub struct ScanResult {
    /// Variables whose name matches a known axis name.
    pub dim_var_list: Vec<String>,
    /// variable -> ordered dimension names, outermost first.
    pub dims_attached_to_vars: BTreeMap<String, Vec<String>>,
    /// Per-location axis size this scan resolves to (`nlocs`, derived for
    /// legacy files per the `nobs / nvars` rule).
    pub nlocs: usize,
    pub nvars: usize,
}

const AXIS_NAMES: &[&str] = &["nlocs", "nobs", "nrecs", "nvars", "nchans"];

/// Scan `backend`'s root group plus every variable it carries a dimension
/// list for. `variable_names` lists every on-disk variable name (root and
/// grouped) to probe via [`crate::backend::Backend::dim_names`].
pub fn scan(backend: &dyn Backend, variable_names: &[String]) -> Result<ScanResult> {
    let axis_sizes = backend.axis_sizes();

    let mut dim_var_list = Vec::new();
    let mut dims_attached_to_vars = BTreeMap::new();
    for name in variable_names {
        let dims = backend.dim_names(name);
        if AXIS_NAMES.contains(&name.as_str()) {
            dim_var_list.push(name.clone());
        }
        dims_attached_to_vars.insert(name.clone(), dims);
    }
    dim_var_list.sort();

    let (nlocs, nvars) = resolve_axis_sizes(&axis_sizes)?;

    Ok(ScanResult { dim_var_list, dims_attached_to_vars, nlocs, nvars })
}

/// Legacy-format rule: presence of `nrecs` is the modern/legacy switch,
/// since there is no version number to check directly. Modern files
/// provide `nlocs` directly; legacy files derive it from `nobs / nvars`,
/// failing fast on non-divisibility.
fn resolve_axis_sizes(axis_sizes: &BTreeMap<String, usize>) -> Result<(usize, usize)> {
    if axis_sizes.contains_key("nrecs") {
        let nlocs = *axis_sizes.get("nlocs").unwrap_or(&0);
        let nvars = *axis_sizes.get("nvars").unwrap_or(&1);
        return Ok((nlocs, nvars));
    }

    if let Some(&nlocs) = axis_sizes.get("nlocs") {
        let nvars = *axis_sizes.get("nvars").unwrap_or(&1);
        return Ok((nlocs, nvars));
    }

    let nobs = *axis_sizes.get("nobs").unwrap_or(&0);
    let nvars = *axis_sizes.get("nchans").unwrap_or(&1);
    if nvars == 0 || nobs % nvars != 0 {
        return err_at!(
            InvalidConfig,
            msg: "legacy file nobs={} not divisible by nvars={}",
            nobs,
            nvars
        );
    }
    Ok((nobs / nvars, nvars))
}

/// Whether `v` is locations-dimensioned: its first attached dimension
/// name is `"nlocs"`. In legacy mode (no `nrecs` dimension and so no real
/// dimension names for rank-1 variables) every rank-1 variable is treated
/// as locations-dimensioned instead.
pub fn is_locations_dimensioned(scan: &ScanResult, variable: &str, rank: usize, is_legacy: bool) -> bool {
    match scan.dims_attached_to_vars.get(variable) {
        Some(dims) if !dims.is_empty() => dims[0] == "nlocs",
        _ => is_legacy && rank == 1,
    }
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod scanner_test;
