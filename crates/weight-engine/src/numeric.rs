// Number parsing for weights and values as printed on shipping documents

/// Parse a printed quantity, accepting thousands separators and either
/// decimal convention: `1,234.5`, `1.234,5`, `1 234,5` (NBSP), `95,5`, `190`.
///
/// Returns `None` for anything with inconsistent grouping (`12.3.4`,
/// `1,23,456.0`) rather than guessing.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '\u{a0}' && *c != '\u{202f}')
        .collect();

    let allowed = |c: char| c.is_ascii_digit() || c == ',' || c == '.';
    if cleaned.is_empty() || !cleaned.chars().all(allowed) {
        return None;
    }

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    let normalized = match (commas, dots) {
        (0, 0) | (0, 1) => cleaned,
        (1, 0) => {
            let (int_part, frac) = cleaned.split_once(',')?;
            if frac.len() == 3
                && (1..=3).contains(&int_part.len())
                && !int_part.starts_with('0')
            {
                // 1,234 reads as thousands; 0,500 can only be a decimal
                format!("{int_part}{frac}")
            } else {
                format!("{int_part}.{frac}")
            }
        }
        (_, 0) => ungroup(&cleaned, ',')?,
        (0, _) => ungroup(&cleaned, '.')?,
        _ => {
            // Both present: whichever comes last is the decimal separator
            let last_comma = cleaned.rfind(',')?;
            let last_dot = cleaned.rfind('.')?;
            let (thousands, decimal) = if last_dot > last_comma {
                (',', '.')
            } else {
                ('.', ',')
            };
            let (int_part, frac) = cleaned.rsplit_once(decimal)?;
            if int_part.contains(decimal) || frac.is_empty() {
                return None;
            }
            format!("{}.{}", ungroup(int_part, thousands)?, frac)
        }
    };

    let value = normalized.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Strip thousands separators after checking the groups are well formed
fn ungroup(int_part: &str, separator: char) -> Option<String> {
    let mut groups = int_part.split(separator);
    let head = groups.next()?;
    if head.is_empty() || head.len() > 3 || head.starts_with('0') {
        return None;
    }

    let mut digits = head.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}
