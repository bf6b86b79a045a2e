//! Name casings substituted into generated code.
//!
//! The component name appears in three forms: uppercased in the include guard,
//! lowercased in the namespace and include paths, and title-cased in class names.

pub fn upper(name: &str) -> String {
    name.to_uppercase()
}

pub fn lower(name: &str) -> String {
    name.to_lowercase()
}

/// Title-case every run of letters.
///
/// The first letter of each run is uppercased and the rest lowercased; digits,
/// underscores and other non-letters end a run. `calc_lang` becomes
/// `Calc_Lang`, `x86asm` becomes `X86Asm`. Component names are ASCII (see
/// [`BackendRequest::validate`](crate::params::BackendRequest::validate)).
pub fn title(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && !in_run {
            out.extend(c.to_uppercase());
        } else if cased {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        in_run = cased;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_simple() {
        assert_eq!(title("expr"), "Expr");
        assert_eq!(title("EXPR"), "Expr");
    }

    #[test]
    fn test_title_underscores_and_digits() {
        assert_eq!(title("calc_lang"), "Calc_Lang");
        assert_eq!(title("x86asm"), "X86Asm");
        assert_eq!(title("_py"), "_Py");
    }

    #[test]
    fn test_upper_lower() {
        assert_eq!(upper("Calc_lang"), "CALC_LANG");
        assert_eq!(lower("Calc_Lang"), "calc_lang");
    }

    #[test]
    fn test_empty() {
        assert_eq!(title(""), "");
    }
}
