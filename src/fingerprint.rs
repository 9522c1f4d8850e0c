use regex::Regex;

/// One normalization step.
#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

/// Rules, in application order. Later rules expect the earlier ones to have
/// run: literals are stripped before whitespace is collapsed.
const RULES: [(&str, &str); 11] = [
    // Comments
    (r"(.*)/\*.*\*/(.*)", "$1$2"),
    (r"(.*) --.*", "$1"),
    // Multi-row INSERT collapsed to a single VALUES list
    (r"^(insert .*) values.*", "$1 values (?)"),
    // Literals after a comparison operator
    (r"\s*([!><=]{1,2})\s*'[^']+'", " $1 ?"),
    (r"\s*([!><=]{1,2})\s*`[^`]+`", " $1 ?"),
    (r"\s*([!><=]{1,2})\s*[\.a-zA-Z0-9_-]+", " $1 ?"),
    (r"\s*(not)?\s+like\s+'[^']+'", " not like ?"),
    // Whitespace
    (r"[\s]{2,}", " "),
    (r"\s$", ""),
    // Lists and paging
    (r"in\s+\([^\)]+\)", "in (?)"),
    (r"offset\s+\d+", "offset ?"),
];

/// Generates query fingerprints.
///
/// A fingerprint is the lowercase query with its literals replaced by `?`,
/// so that queries differing only by their parameters group together.
///
/// Normalization includes:
/// - Removing comments
/// - Collapsing multi-row `INSERT ... VALUES` to `VALUES (?)`
/// - Replacing values compared with `=`, `<`, `>`, `!=`, ... with `?`
/// - Replacing `[NOT] LIKE 'pattern'` with `not like ?`
/// - Collapsing whitespace
/// - Collapsing `IN (...)` lists and `OFFSET n`
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    rules: Vec<Rule>,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|&(pattern, replacement)| Rule {
                pattern: Regex::new(pattern).expect("valid fingerprint rule"),
                replacement,
            })
            .collect();
        Self { rules }
    }

    pub fn fingerprint(&self, sql: &str) -> String {
        self.rules
            .iter()
            .fold(sql.to_lowercase(), |acc, rule| {
                rule.pattern.replace_all(&acc, rule.replacement).into_owned()
            })
    }

    /// Hex MD5 of a fingerprint. Used as the aggregation key.
    pub fn hash(fingerprint: &str) -> String {
        format!("{:x}", md5::compute(fingerprint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(sql: &str) -> String {
        Fingerprinter::new().fingerprint(sql)
    }

    #[test]
    fn test_fingerprint_basic() {
        let sql = "SELECT * FROM users WHERE id = 1";
        assert_eq!(fingerprint(sql), "select * from users where id = ?");
    }

    #[test]
    fn test_fingerprint_strings() {
        let sql = "SELECT * FROM users WHERE name = 'Alice'";
        assert_eq!(fingerprint(sql), "select * from users where name = ?");
    }

    #[test]
    fn test_fingerprint_backticks() {
        let sql = "SELECT * FROM users WHERE name = `Alice`";
        assert_eq!(fingerprint(sql), "select * from users where name = ?");
    }

    #[test]
    fn test_fingerprint_operators() {
        let sql = "SELECT * FROM t WHERE a>=10 AND b != 'x' AND c<3";
        assert_eq!(
            fingerprint(sql),
            "select * from t where a >= ? and b != ? and c < ?"
        );
    }

    #[test]
    fn test_fingerprint_in_list() {
        let sql = "SELECT * FROM users WHERE id IN (1, 2, 3)";
        assert_eq!(fingerprint(sql), "select * from users where id in (?)");
    }

    #[test]
    fn test_fingerprint_insert_values() {
        let sql = "INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y'), (3, 'z')";
        assert_eq!(fingerprint(sql), "insert into t (a, b) values (?)");
    }

    #[test]
    fn test_fingerprint_like() {
        let sql = "SELECT * FROM t WHERE name LIKE 'foo%'";
        assert_eq!(fingerprint(sql), "select * from t where name not like ?");

        let sql = "SELECT * FROM t WHERE name NOT LIKE 'foo%'";
        assert_eq!(fingerprint(sql), "select * from t where name not like ?");
    }

    #[test]
    fn test_fingerprint_whitespace() {
        let sql = "SELECT    *   FROM   users  ";
        assert_eq!(fingerprint(sql), "select * from users");
    }

    #[test]
    fn test_fingerprint_comments() {
        let sql = "SELECT a FROM t /* hint */ WHERE b = 2";
        assert_eq!(fingerprint(sql), "select a from t where b = ?");

        let sql = "SELECT a FROM t WHERE b = 2 -- trailing";
        assert_eq!(fingerprint(sql), "select a from t where b = ?");
    }

    #[test]
    fn test_fingerprint_offset() {
        let sql = "SELECT * FROM t ORDER BY id LIMIT 10 OFFSET 20";
        assert_eq!(fingerprint(sql), "select * from t order by id limit 10 offset ?");
    }

    #[test]
    fn test_fingerprint_groups_parameters() {
        let fp = Fingerprinter::new();
        assert_eq!(
            fp.fingerprint("SELECT * FROM users WHERE id = 1"),
            fp.fingerprint("select *  from users where id=42")
        );
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let fp = Fingerprinter::new();
        let sql = "UPDATE t SET a = 'b' WHERE id IN (1,2) /* x */";
        assert_eq!(fp.fingerprint(sql), fp.fingerprint(sql));
        assert_eq!(fp.fingerprint(sql), Fingerprinter::new().fingerprint(sql));
    }

    #[test]
    fn test_hash() {
        assert_eq!(
            Fingerprinter::hash("foobar"),
            "3858f62230ac3c915f300c664312c63f"
        );
        assert_eq!(
            Fingerprinter::hash("some long string"),
            "2fb66bbfb88cdf9e07a3f1d1dfad71ab"
        );
    }
}
