//! Deterministic rupee amount formatting.
//!
//! Video templates bake amounts into text layers, so grouping must be
//! identical on every run regardless of process locale. Two groupings are
//! in use: the Indian 2-2-3 convention (`17,95,988`) and the western 3-3-3
//! convention (`1,795,988`).

/// Format a whole-rupee amount with Indian digit grouping.
///
/// The last three digits form one group, every group above that has two
/// digits. Negative amounts keep a leading minus sign.
///
/// # Examples
///
/// ```
/// use planreel_core::money::format_inr;
///
/// assert_eq!(format_inr(100_000), "1,00,000");
/// assert_eq!(format_inr(1_795_988), "17,95,988");
/// assert_eq!(format_inr(999), "999");
/// ```
pub fn format_inr(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let formatted = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{tail}", groups.join(","))
    };
    if n < 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Format a whole-rupee amount with western thousands grouping.
///
/// # Examples
///
/// ```
/// use planreel_core::money::format_grouped;
///
/// assert_eq!(format_grouped(1_000_000), "1,000,000");
/// assert_eq!(format_grouped(5_000), "5,000");
/// ```
pub fn format_grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut groups = Vec::new();
    let mut rest = digits.as_str();
    while rest.len() > 3 {
        let (left, right) = rest.split_at(rest.len() - 3);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();
    let formatted = groups.join(",");
    if n < 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}
