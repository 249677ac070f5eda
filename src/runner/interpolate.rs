//! Variable interpolation for strings
//!
//! Replaces `${name}` with values from the moanfile's `config` section, falling back
//! to environment variables. Values may themselves contain `${...}` references.

use crate::error::{InterpolationError, InterpolationResult};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::env;

static VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// How many rounds of nested substitution are attempted before giving up
const MAX_DEPTH: usize = 32;

fn lookup(name: &str, vars: &HashMap<String, String>) -> Option<String> {
    vars.get(name).cloned().or_else(|| env::var(name).ok())
}

/// Interpolate variables in a string.
///
/// Unknown variables are left untouched so the shell can still expand them.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    let re = &*VARIABLE;
    let mut result = s.to_string();

    for _ in 0..MAX_DEPTH {
        let mut changed = false;
        let next = re
            .replace_all(&result, |caps: &Captures| match lookup(&caps[1], vars) {
                Some(value) => {
                    changed = true;
                    value
                }
                None => caps[0].to_string(),
            })
            .into_owned();

        if !changed {
            return Ok(next);
        }
        result = next;
    }

    Err(InterpolationError::RecursiveInterpolation)
}

/// Interpolate with strict mode - errors on undefined variables
pub fn interpolate_strict(
    s: &str,
    vars: &HashMap<String, String>,
) -> InterpolationResult<String> {
    let result = interpolate(s, vars)?;

    if let Some(caps) = VARIABLE.captures(&result) {
        return Err(InterpolationError::UndefinedVariable(caps[1].to_string()));
    }

    Ok(result)
}

/// Interpolate a list of strings
pub fn interpolate_list(
    list: &[String],
    vars: &HashMap<String, String>,
) -> InterpolationResult<Vec<String>> {
    list.iter().map(|s| interpolate_strict(s, vars)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_interpolation() {
        let vars = vars(&[("name", "world")]);
        assert_eq!(interpolate("Hello, ${name}!", &vars).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_nested_interpolation() {
        let vars = vars(&[("out", "${root}/dist"), ("root", "/srv")]);
        assert_eq!(interpolate("rm -rf ${out}", &vars).unwrap(), "rm -rf /srv/dist");
    }

    #[test]
    fn test_unknown_variable_left_for_shell() {
        let vars = HashMap::new();
        assert_eq!(
            interpolate("echo ${MOAN_SURELY_UNDEFINED_VAR}", &vars).unwrap(),
            "echo ${MOAN_SURELY_UNDEFINED_VAR}"
        );
    }

    #[test]
    fn test_recursive_interpolation() {
        let vars = vars(&[("a", "${b}"), ("b", "${a}")]);
        assert!(matches!(
            interpolate("${a}", &vars),
            Err(InterpolationError::RecursiveInterpolation)
        ));
    }

    #[test]
    fn test_strict_undefined() {
        let vars = HashMap::new();
        let result = interpolate_strict("${MOAN_SURELY_UNDEFINED_VAR}/x", &vars);
        assert!(matches!(
            result,
            Err(InterpolationError::UndefinedVariable(name)) if name == "MOAN_SURELY_UNDEFINED_VAR"
        ));
    }

    #[test]
    fn test_interpolate_list() {
        let vars = vars(&[("out", "target")]);
        let list = vec!["${out}/**".to_string(), "!${out}/keep".to_string()];
        assert_eq!(
            interpolate_list(&list, &vars).unwrap(),
            vec!["target/**", "!target/keep"]
        );
    }
}
