//! Wildcard matching for IAM actions and resources
//!
//! IAM supports two wildcards inside action and resource strings:
//! - `*` - Matches any run of characters, including none (e.g., `s3:Get*`)
//! - `?` - Matches exactly one character (e.g., `arn:aws:s3:::logs-202?`)
//!
//! Actions compare case-insensitively, resources case-sensitively.

/// Pattern matcher for IAM action and resource strings
pub struct PatternMatcher;

impl PatternMatcher {
    /// Check if an action matches a pattern (case-insensitive)
    ///
    /// # Examples
    /// ```
    /// use policyfox::iam::PatternMatcher;
    ///
    /// assert!(PatternMatcher::matches_action("s3:Get*", "s3:GetObject"));
    /// assert!(PatternMatcher::matches_action("S3:GETOBJECT", "s3:GetObject"));
    /// assert!(!PatternMatcher::matches_action("s3:Get*", "s3:PutObject"));
    /// ```
    pub fn matches_action(pattern: &str, action: &str) -> bool {
        Self::glob(
            pattern.to_ascii_lowercase().as_bytes(),
            action.to_ascii_lowercase().as_bytes(),
        )
    }

    /// Check if a resource ARN matches a pattern (case-sensitive)
    ///
    /// # Examples
    /// ```
    /// use policyfox::iam::PatternMatcher;
    ///
    /// assert!(PatternMatcher::matches_resource("arn:aws:s3:::bucket/*", "arn:aws:s3:::bucket/key"));
    /// assert!(!PatternMatcher::matches_resource("arn:aws:s3:::Bucket/*", "arn:aws:s3:::bucket/key"));
    /// ```
    pub fn matches_resource(pattern: &str, resource: &str) -> bool {
        Self::glob(pattern.as_bytes(), resource.as_bytes())
    }

    /// Iterative glob match with single-star backtracking
    fn glob(pattern: &[u8], text: &[u8]) -> bool {
        let (mut p, mut t) = (0, 0);
        // Position of the last `*` seen and the text index it currently covers up to
        let mut star: Option<(usize, usize)> = None;

        while t < text.len() {
            if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
                p += 1;
                t += 1;
            } else if p < pattern.len() && pattern[p] == b'*' {
                star = Some((p, t));
                p += 1;
            } else if let Some((star_p, star_t)) = star {
                // Let the last star swallow one more character
                p = star_p + 1;
                t = star_t + 1;
                star = Some((star_p, star_t + 1));
            } else {
                return false;
            }
        }

        pattern[p..].iter().all(|&c| c == b'*')
    }
}
