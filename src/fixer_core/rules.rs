use crate::fixer_core::error::Result;
use crate::fixer_core::media;
use crate::fixer_core::sidecar::METADATA_TAG;
use regex::Regex;

/// A single filename rewrite: a regex over the whole filename and the
/// replacement template (`$name` / `${name}` capture references).
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    pattern: Regex,
    replacement: String,
}

/// The outcome of applying a rule set to one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub rule: String,
    pub filename: String,
}

impl RewriteRule {
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self> {
        Ok(RewriteRule {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rewrite a filename, or `None` if the rule doesn't match or the
    /// result would be unchanged.
    pub fn apply(&self, filename: &str) -> Option<String> {
        let caps = self.pattern.captures(filename)?;
        let mut rewritten = String::with_capacity(filename.len() + METADATA_TAG.len());
        caps.expand(&self.replacement, &mut rewritten);
        (rewritten != filename).then_some(rewritten)
    }
}

/// Ordered list of rewrite rules, evaluated first-match-wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    /// The malformed sidecar names observed in takeout exports, most specific first.
    ///
    /// The export service truncates long sidecar names anywhere inside the
    /// `supplemental-metadata` tag and moves the duplicate counter of colliding
    /// photos to the end of the sidecar name. Older exports omit the tag entirely.
    pub fn builtin() -> Result<Self> {
        let media = media_alternation();
        let any_tag = tag_prefix_alternation(METADATA_TAG.len());
        let truncated_tag = tag_prefix_alternation(METADATA_TAG.len() - 1);
        let canonical = format!("{}.json", METADATA_TAG);

        let mut rules = RuleSet::default();

        // IMG_0001.jpg.supplemental-metadata(1).json -> IMG_0001(1).jpg.supplemental-metadata.json
        rules.push(RewriteRule::new(
            "numbered",
            &format!(r"^(?P<stem>.+)\.(?P<ext>{media})\.(?:{any_tag})\((?P<n>\d+)\)\.json$"),
            format!("${{stem}}(${{n}}).${{ext}}.{canonical}"),
        )?);

        // IMG_0001.jpg(1).json -> IMG_0001(1).jpg.supplemental-metadata.json
        rules.push(RewriteRule::new(
            "legacy-numbered",
            &format!(r"^(?P<stem>.+)\.(?P<ext>{media})\((?P<n>\d+)\)\.json$"),
            format!("${{stem}}(${{n}}).${{ext}}.{canonical}"),
        )?);

        // IMG_0001.jpg.supplemental-metadat.json -> IMG_0001.jpg.supplemental-metadata.json
        rules.push(RewriteRule::new(
            "truncated",
            &format!(r"^(?P<photo>.+\.(?:{media}))\.(?:{truncated_tag})\.json$"),
            format!("${{photo}}.{canonical}"),
        )?);

        // IMG_0001.jpg.json -> IMG_0001.jpg.supplemental-metadata.json
        rules.push(RewriteRule::new(
            "legacy",
            &format!(r"^(?P<photo>.+\.(?:{media}))\.json$"),
            format!("${{photo}}.{canonical}"),
        )?);

        Ok(rules)
    }

    /// Append a rule; it is tried after every rule already in the set.
    pub fn push(&mut self, rule: RewriteRule) {
        self.rules.push(rule);
    }

    /// Apply the first matching rule to a filename.
    pub fn rewrite(&self, filename: &str) -> Option<Rewrite> {
        self.rules.iter().find_map(|rule| {
            rule.apply(filename).map(|rewritten| Rewrite {
                rule: rule.name().to_string(),
                filename: rewritten,
            })
        })
    }
}

/// Case-insensitive alternation of every known media extension.
fn media_alternation() -> String {
    let exts: Vec<String> = media::all_extensions().map(regex::escape).collect();
    format!("(?i:{})", exts.join("|"))
}

/// Alternation of the non-empty prefixes of the metadata tag up to `max_len`
/// characters, longest first.
fn tag_prefix_alternation(max_len: usize) -> String {
    let prefixes: Vec<String> = (1..=max_len)
        .rev()
        .map(|len| regex::escape(&METADATA_TAG[..len]))
        .collect();
    prefixes.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(filename: &str) -> Option<(String, String)> {
        RuleSet::builtin()
            .unwrap()
            .rewrite(filename)
            .map(|r| (r.rule, r.filename))
    }

    fn rewritten(filename: &str) -> Option<String> {
        rewrite(filename).map(|(_, name)| name)
    }

    #[test]
    fn test_truncated_suffixes() {
        assert_eq!(
            rewritten("IMG_0001.jpg.supplemental-metadat.json").as_deref(),
            Some("IMG_0001.jpg.supplemental-metadata.json")
        );
        assert_eq!(
            rewritten("IMG_0001.jpg.suppl.json").as_deref(),
            Some("IMG_0001.jpg.supplemental-metadata.json")
        );
        assert_eq!(
            rewritten("PXL_20230704_181912345.PORTRAIT.jpg.s.json").as_deref(),
            Some("PXL_20230704_181912345.PORTRAIT.jpg.supplemental-metadata.json")
        );
        assert_eq!(
            rewrite("clip.MP4.supplemental-m.json")
                .map(|(rule, _)| rule)
                .as_deref(),
            Some("truncated")
        );
    }

    #[test]
    fn test_numbered_suffixes() {
        assert_eq!(
            rewrite("20210529_155539.jpg.supplemental-metadata(1).json"),
            Some((
                "numbered".to_string(),
                "20210529_155539(1).jpg.supplemental-metadata.json".to_string()
            ))
        );
        assert_eq!(
            rewritten("IMG_0001.HEIC.supplemen(12).json").as_deref(),
            Some("IMG_0001(12).HEIC.supplemental-metadata.json")
        );
    }

    #[test]
    fn test_legacy_suffixes() {
        assert_eq!(
            rewrite("IMG_0001.jpg.json"),
            Some((
                "legacy".to_string(),
                "IMG_0001.jpg.supplemental-metadata.json".to_string()
            ))
        );
        assert_eq!(
            rewrite("IMG_0001.jpg(2).json"),
            Some((
                "legacy-numbered".to_string(),
                "IMG_0001(2).jpg.supplemental-metadata.json".to_string()
            ))
        );
    }

    #[test]
    fn test_canonical_names_untouched() {
        assert_eq!(rewrite("IMG_0001.jpg.supplemental-metadata.json"), None);
        assert_eq!(rewrite("IMG_0001(1).jpg.supplemental-metadata.json"), None);
        assert_eq!(rewrite("20210529_155539(1).mp4.supplemental-metadata.json"), None);
    }

    #[test]
    fn test_unrelated_files_untouched() {
        assert_eq!(rewrite("IMG_0001.jpg"), None);
        assert_eq!(rewrite("metadata.json"), None);
        assert_eq!(rewrite("print-subscriptions.json"), None);
        assert_eq!(rewrite("notes.txt.suppl.json"), None);
    }

    #[test]
    fn test_rewrites_are_idempotent() {
        let rules = RuleSet::builtin().unwrap();
        for name in [
            "IMG_0001.jpg.supplemental-metadat.json",
            "IMG_0001.jpg.supplemental-metadata(3).json",
            "IMG_0001.jpg(3).json",
            "IMG_0001.jpg.json",
        ] {
            let fixed = rules.rewrite(name).unwrap().filename;
            assert!(fixed.ends_with(".supplemental-metadata.json"), "{fixed}");
            assert_eq!(rules.rewrite(&fixed), None, "{fixed} rewritten again");
        }
    }

    #[test]
    fn test_first_match_wins_and_push() {
        let mut rules = RuleSet::default();
        rules.push(RewriteRule::new("first", r"^(?P<x>.+)\.old$", "${x}.new").unwrap());
        rules.push(RewriteRule::new("second", r"^(?P<x>.+)\.old$", "${x}.other").unwrap());
        assert_eq!(
            rules.rewrite("a.old"),
            Some(Rewrite {
                rule: "first".to_string(),
                filename: "a.new".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RewriteRule::new("broken", "(unclosed", "x").is_err());
    }
}
