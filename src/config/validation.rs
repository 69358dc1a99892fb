//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for BlendConfig.
///
/// Maintained by hand to match the struct hierarchy in blend_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [solver]
        "solver",
        "solver.tolerance",
        // [projection]
        "projection",
        "projection.display_threshold_percent",
        // [analysis]
        "analysis",
        "analysis.currency",
        "analysis.active_source_percent",
        // [server]
        "server",
        "server.addr",
        "server.solve_timeout_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Levenshtein edit distance over Unicode scalar values.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors surface from serde
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Range Validation
// ============================================================================

fn check_finite(name: &str, value: f64, errors: &mut Vec<String>) -> bool {
    if value.is_finite() {
        true
    } else {
        errors.push(format!("{name} = {value} must be a finite number"));
        false
    }
}

/// Validate value ranges on a parsed BlendConfig.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_ranges(config: &super::BlendConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let tol = config.solver.tolerance;
    if check_finite("solver.tolerance", tol, &mut errors) && (tol <= 0.0 || tol >= 1.0) {
        errors.push(format!("solver.tolerance = {tol:e} must be in (0, 1)"));
    }
    if tol.is_finite() && tol > 1e-3 && tol < 1.0 {
        warnings.push(ValidationWarning {
            field: "solver.tolerance".to_string(),
            message: format!("solver.tolerance = {tol:e} is loose; quantities may snap by whole tons"),
            suggestion: None,
        });
    }

    let display = config.projection.display_threshold_percent;
    if check_finite("projection.display_threshold_percent", display, &mut errors)
        && !(0.0..100.0).contains(&display)
    {
        errors.push(format!(
            "projection.display_threshold_percent = {display:.2} must be in [0, 100)"
        ));
    }

    let active = config.analysis.active_source_percent;
    if check_finite("analysis.active_source_percent", active, &mut errors)
        && !(0.0..100.0).contains(&active)
    {
        errors.push(format!(
            "analysis.active_source_percent = {active:.2} must be in [0, 100)"
        ));
    }

    if config.analysis.currency.trim().is_empty() {
        warnings.push(ValidationWarning {
            field: "analysis.currency".to_string(),
            message: "analysis.currency is empty; cost figures will carry no unit".to_string(),
            suggestion: None,
        });
    }

    if config.server.solve_timeout_secs == 0 {
        errors.push("server.solve_timeout_secs must be > 0".to_string());
    }

    if config.server.addr.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!(
            "server.addr = '{}' is not a valid socket address",
            config.server.addr
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
