//! User-input classification for new overlay layers.
//!
//! A freshly entered URL (or non-URL token) is matched against an ordered
//! rule table to derive a suggested layer name and the render path. The
//! confirm/rename interaction happens outside this crate; callers pass the
//! final chosen name along explicitly.

/// Result of classifying a user-entered layer source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Suggested layer name; the user may override it.
    pub layer_name: String,

    /// Whether the source requires the generated-raster render path.
    pub is_generated_raster: bool,
}

/// How a rule matches the (uppercased) input.
enum Matcher {
    /// Case-insensitive substring match.
    Contains(&'static str),
}

/// One classification rule: matched in declaration order, first hit wins.
struct Rule {
    matcher: Matcher,
    /// Layer family the rule assigns; None keeps the raw input as the name.
    family: Option<&'static str>,
    is_generated_raster: bool,
}

/// Ordered rule table. The GeoTIFF token comes first and selects the raster
/// path with the raw input as the name; the known layer-family markers follow.
const RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Contains("GEOTIFF"),
        family: None,
        is_generated_raster: true,
    },
    Rule {
        matcher: Matcher::Contains("NDVI"),
        family: Some("NDVI"),
        is_generated_raster: false,
    },
    Rule {
        matcher: Matcher::Contains("NDRE"),
        family: Some("NDRE"),
        is_generated_raster: false,
    },
    Rule {
        matcher: Matcher::Contains("THLA"),
        family: Some("THLA"),
        is_generated_raster: false,
    },
    Rule {
        matcher: Matcher::Contains("RGB"),
        family: Some("RGB"),
        is_generated_raster: false,
    },
];

/// Classify a user-entered layer source.
///
/// Falls through to the direct-tile path with the raw input as the name when
/// no rule matches.
pub fn classify(input: &str) -> Classification {
    let upper = input.to_uppercase();

    for rule in RULES {
        let hit = match rule.matcher {
            Matcher::Contains(token) => upper.contains(token),
        };
        if hit {
            return Classification {
                layer_name: match rule.family {
                    Some(family) => family.to_string(),
                    None => input.to_string(),
                },
                is_generated_raster: rule.is_generated_raster,
            };
        }
    }

    Classification {
        layer_name: input.to_string(),
        is_generated_raster: false,
    }
}
