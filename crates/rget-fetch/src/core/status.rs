/// How the resume loop reacts to a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200: the server ignored the range and sent the whole body.
    WholeBody,
    /// 206
    Partial,
    /// 300-399, left to the transport's own redirect handling.
    Redirect,
    /// 416
    RangeNotSatisfiable,
    /// 500-599
    ServerError,
    Other,
}

pub fn classify(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::WholeBody,
        206 => StatusClass::Partial,
        416 => StatusClass::RangeNotSatisfiable,
        s if is_redirect(s) => StatusClass::Redirect,
        500..=599 => StatusClass::ServerError,
        _ => StatusClass::Other,
    }
}

/// Returns `true` for any 3xx status.
///
/// ```
/// use rget_fetch::core::is_redirect;
///
/// assert!(is_redirect(301));
/// assert!(is_redirect(304));
/// assert!(!is_redirect(200));
/// assert!(!is_redirect(416));
/// ```
pub fn is_redirect(status: u16) -> bool { (300..=399).contains(&status) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_redirect_bounds() {
        assert!(!is_redirect(299));
        assert!(is_redirect(300));
        assert!(is_redirect(399));
        assert!(!is_redirect(400));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(200), StatusClass::WholeBody);
        assert_eq!(classify(206), StatusClass::Partial);
        assert_eq!(classify(302), StatusClass::Redirect);
        assert_eq!(classify(416), StatusClass::RangeNotSatisfiable);
        assert_eq!(classify(503), StatusClass::ServerError);
    }

    #[test]
    fn test_classify_everything_else_is_other() {
        for code in [100, 201, 204, 400, 401, 403, 404, 429, 600] {
            assert_eq!(classify(code), StatusClass::Other, "code {code}");
        }
    }
}
