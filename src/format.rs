//! Number and label formatting shared by the console reports.

/// `1234567.89` → `"1,234,567.9"`.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.1}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && !fixed.trim_start_matches(['0', '.']).is_empty() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Fraction as a percentage with two decimals: `0.0556` → `"5.56%"`.
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Per-year error cell; undefined errors come from a zero external value.
pub fn percent_or_na(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) => percent(f),
        None => "n/a (EIA = 0)".to_string(),
    }
}

/// Title-cases a label the way report headings expect: every run of letters
/// starts upper case and continues lower case, so `"non-PC office equipment"`
/// becomes `"Non-Pc Office Equipment"`.
pub fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_word = false;
    for c in label.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0.0")]
    #[case(999.94, "999.9")]
    #[case(1234.56, "1,234.6")]
    #[case(1234567.0, "1,234,567.0")]
    #[case(-98765.4, "-98,765.4")]
    #[case(-0.01, "0.0")]
    fn thousands_groups_digits(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(thousands(value), expected);
    }

    #[test]
    fn percent_cells() {
        assert_eq!(percent(0.05555), "5.56%");
        assert_eq!(percent_or_na(None), "n/a (EIA = 0)");
        assert_eq!(percent_or_na(Some(0.0)), "0.00%");
    }

    #[rstest]
    #[case("natural gas", "Natural Gas")]
    #[case("non-PC office equipment", "Non-Pc Office Equipment")]
    #[case("TVs", "Tvs")]
    #[case("PCs", "Pcs")]
    #[case("mercantile/service", "Mercantile/Service")]
    fn title_case_words(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(title_case(label), expected);
    }
}
