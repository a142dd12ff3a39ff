//! # Canonical Job Normalizer
//! Converts one heterogeneous raw posting into the canonical schema:
//! trimmed/case-folded title and company, structured location, tech-stack
//! tags from a maintained vocabulary, and a parsed salary range.
//!
//! Everything degrades gracefully: an unparseable salary or location is
//! left empty/unknown, never an error. The only hard failure is an empty
//! title or company after trimming (`MalformedPosting`).
//!
//! - Location parsing uses a lookup table (city → region/country) plus
//!   heuristics; "remote" is detected independently of city parsing.
//! - Tag extraction is case-insensitive with word-boundary tokens and an
//!   alias map ("golang" → "go", "k8s" → "kubernetes", ...).
//! - Aliases and table entries can be overridden from config; a built-in
//!   `default_seed()` covers the common cases.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{CanonicalFields, Location, RawPosting, SalaryRange};

/// Lowercase + collapse inner whitespace. Basis for all comparisons.
pub fn fold(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Company fold that also drops legal-form suffixes, so "Acme Inc." and
/// "Acme" land in the same dedup bucket.
pub fn fold_company(s: &str) -> String {
    let mut folded = fold(s);
    for ch in ['.', ','] {
        folded = folded.replace(ch, " ");
    }
    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    while let Some(last) = tokens.last() {
        if matches!(
            *last,
            "inc" | "llc" | "ltd" | "gmbh" | "corp" | "co" | "sro" | "ag" | "plc" | "bv"
        ) && tokens.len() > 1
        {
            tokens.pop();
        } else {
            break;
        }
    }
    tokens.join(" ")
}

/// Collapse whitespace and trim, keeping the original casing for display.
fn tidy(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Description cleanup for scraped HTML: entity decode, tag strip,
/// whitespace collapse, length cap.
pub fn clean_description(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 20k chars is plenty for similarity + tag extraction.
    if out.chars().count() > 20_000 {
        out = out.chars().take(20_000).collect();
    }
    out
}

// ---------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------

/// City/region/country lookup table with a built-in seed. Config can
/// extend or override entries.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationTable {
    /// city → (region, country)
    #[serde(default)]
    pub cities: HashMap<String, (String, String)>,
    /// region → country
    #[serde(default)]
    pub regions: HashMap<String, String>,
    /// country aliases → canonical country code
    #[serde(default)]
    pub countries: HashMap<String, String>,
}

impl LocationTable {
    /// Built-in seed with common tech-hub cities. Used as fallback if no
    /// table is configured.
    pub fn default_seed() -> Self {
        let mut cities = HashMap::new();
        for (city, region, country) in [
            ("san francisco", "california", "us"),
            ("los angeles", "california", "us"),
            ("san jose", "california", "us"),
            ("new york", "new york", "us"),
            ("brooklyn", "new york", "us"),
            ("austin", "texas", "us"),
            ("seattle", "washington", "us"),
            ("boston", "massachusetts", "us"),
            ("denver", "colorado", "us"),
            ("chicago", "illinois", "us"),
            ("atlanta", "georgia", "us"),
            ("london", "england", "uk"),
            ("manchester", "england", "uk"),
            ("edinburgh", "scotland", "uk"),
            ("berlin", "berlin", "de"),
            ("munich", "bavaria", "de"),
            ("hamburg", "hamburg", "de"),
            ("paris", "ile-de-france", "fr"),
            ("amsterdam", "north holland", "nl"),
            ("prague", "bohemia", "cz"),
            ("brno", "moravia", "cz"),
            ("vienna", "vienna", "at"),
            ("zurich", "zurich", "ch"),
            ("dublin", "leinster", "ie"),
            ("warsaw", "masovia", "pl"),
            ("madrid", "madrid", "es"),
            ("barcelona", "catalonia", "es"),
            ("lisbon", "lisbon", "pt"),
            ("stockholm", "stockholm", "se"),
            ("toronto", "ontario", "ca"),
            ("vancouver", "british columbia", "ca"),
            ("sydney", "new south wales", "au"),
            ("melbourne", "victoria", "au"),
            ("bangalore", "karnataka", "in"),
            ("tokyo", "kanto", "jp"),
            ("singapore", "singapore", "sg"),
        ] {
            cities.insert(city.to_string(), (region.to_string(), country.to_string()));
        }

        let mut regions = HashMap::new();
        for rc in cities.values() {
            regions.insert(rc.0.clone(), rc.1.clone());
        }

        let mut countries = HashMap::new();
        for (a, c) in [
            ("usa", "us"),
            ("u.s.", "us"),
            ("united states", "us"),
            ("uk", "uk"),
            ("united kingdom", "uk"),
            ("germany", "de"),
            ("france", "fr"),
            ("netherlands", "nl"),
            ("czech republic", "cz"),
            ("czechia", "cz"),
            ("austria", "at"),
            ("switzerland", "ch"),
            ("ireland", "ie"),
            ("poland", "pl"),
            ("spain", "es"),
            ("portugal", "pt"),
            ("sweden", "se"),
            ("canada", "ca"),
            ("australia", "au"),
            ("india", "in"),
            ("japan", "jp"),
        ] {
            countries.insert(a.to_string(), c.to_string());
        }

        Self {
            cities,
            regions,
            countries,
        }
    }

    /// Parse free-text location. Remote detection is independent of city
    /// parsing: "Remote (Berlin)" yields both the flag and the city.
    pub fn parse(&self, text: &str) -> Location {
        let mut loc = Location {
            remote: detects_remote(text),
            ..Default::default()
        };

        static RE_REMOTE_WORDS: OnceCell<Regex> = OnceCell::new();
        let re = RE_REMOTE_WORDS.get_or_init(|| {
            Regex::new(r"(?i)\b(?:fully\s+)?(?:100%\s*)?(remote|work\s+from\s+home|wfh|anywhere|distributed|hybrid)\b")
                .unwrap()
        });
        let stripped = re.replace_all(text, " ");

        for segment in stripped.split(['|', '/', ',', ';', '(', ')']) {
            let seg = fold(segment);
            if seg.is_empty() {
                continue;
            }
            if loc.city.is_none() {
                if let Some((city, (region, country))) = self.lookup_city(&seg) {
                    loc.city = Some(city);
                    if loc.region.is_none() {
                        loc.region = Some(region);
                    }
                    if loc.country.is_none() {
                        loc.country = Some(country);
                    }
                    continue;
                }
            }
            if loc.region.is_none() {
                if let Some(country) = self.regions.get(&seg) {
                    loc.region = Some(seg.clone());
                    if loc.country.is_none() {
                        loc.country = Some(country.clone());
                    }
                    continue;
                }
            }
            if loc.country.is_none() {
                if let Some(c) = self.countries.get(&seg) {
                    loc.country = Some(c.clone());
                }
            }
        }
        loc
    }

    /// Exact lookup first, then a fuzzy pass to absorb scraper typos
    /// ("San Fransisco"). Short segments are never fuzzy-matched.
    fn lookup_city(&self, seg: &str) -> Option<(String, (String, String))> {
        if let Some(rc) = self.cities.get(seg) {
            return Some((seg.to_string(), rc.clone()));
        }
        if seg.chars().count() < 5 {
            return None;
        }
        let mut best: Option<(f64, &String, &(String, String))> = None;
        for (city, rc) in &self.cities {
            let sim = strsim::normalized_levenshtein(seg, city);
            if sim >= 0.84 && best.map(|(b, _, _)| sim > b).unwrap_or(true) {
                best = Some((sim, city, rc));
            }
        }
        best.map(|(_, city, rc)| (city.clone(), rc.clone()))
    }
}

/// Remote keyword detection, usable on location text and titles alike.
pub fn detects_remote(text: &str) -> bool {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\b(remote|work\s+from\s+home|wfh|anywhere|distributed)\b").unwrap()
    });
    re.is_match(text)
}

/// Strip a trailing remote qualifier from a title ("Backend Engineer,
/// Remote" → "Backend Engineer"). Returns the cleaned title and whether
/// a qualifier was found.
fn strip_title_remote(title: &str) -> (String, bool) {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?i)\s*[,\-–—/(\[]*\s*(?:fully\s+)?(?:100%\s*)?(?:remote|work\s+from\s+home|wfh)\s*[)\]]?\s*$",
        )
        .unwrap()
    });
    let cleaned = re.replace(title, "");
    let found = cleaned.len() != title.len();
    (tidy(&cleaned), found)
}

// ---------------------------------------------------------------------
// Tech-stack vocabulary
// ---------------------------------------------------------------------

/// Maintained tag vocabulary with aliases. Matching is case-insensitive
/// on word-boundary tokens; results are deduplicated.
#[derive(Debug, Clone, Deserialize)]
pub struct TechVocabulary {
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// alias → canonical tag
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl TechVocabulary {
    pub fn default_seed() -> Self {
        let tags: BTreeSet<String> = [
            "rust", "go", "python", "java", "kotlin", "swift", "scala", "elixir", "erlang",
            "ruby", "php", "c", "c++", "c#", ".net", "javascript", "typescript", "node.js",
            "react", "react native", "vue", "angular", "svelte", "django", "flask", "rails",
            "spring", "graphql", "grpc", "rest", "kubernetes", "docker", "terraform", "ansible",
            "aws", "gcp", "azure", "linux", "postgres", "mysql", "sqlite", "mongodb", "redis",
            "kafka", "rabbitmq", "elasticsearch", "spark", "airflow", "sql", "nosql", "git",
            "ci/cd", "machine learning", "tensorflow", "pytorch",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let mut aliases = HashMap::new();
        for (a, c) in [
            ("golang", "go"),
            ("k8s", "kubernetes"),
            ("js", "javascript"),
            ("ts", "typescript"),
            ("node", "node.js"),
            ("nodejs", "node.js"),
            ("postgresql", "postgres"),
            ("psql", "postgres"),
            ("reactjs", "react"),
            ("vuejs", "vue"),
            ("dotnet", ".net"),
            ("cpp", "c++"),
            ("csharp", "c#"),
            ("ml", "machine learning"),
            ("es", "elasticsearch"),
            ("ror", "rails"),
            ("ruby on rails", "rails"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self { tags, aliases }
    }

    /// Extract canonical tags from free text. Single tokens and bigrams
    /// are checked against the vocabulary and alias map.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        static RE_TOKEN: OnceCell<Regex> = OnceCell::new();
        let re = RE_TOKEN.get_or_init(|| Regex::new(r"(?i)[a-z0-9+#./]+").unwrap());

        let lower = text.to_lowercase();
        let tokens: Vec<String> = re
            .find_iter(&lower)
            .map(|m| m.as_str().trim_matches(['.', '/']).to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let mut out = BTreeSet::new();
        let mut check = |candidate: &str| {
            if self.tags.contains(candidate) {
                out.insert(candidate.to_string());
            } else if let Some(canon) = self.aliases.get(candidate) {
                out.insert(canon.clone());
            }
        };

        for t in &tokens {
            check(t);
            // tokens like "node.js" keep their inner dot but lose the
            // sentence-final one above; re-check the raw form too
            if t.contains('.') {
                check(t.trim_end_matches('.'));
            }
        }
        for pair in tokens.windows(2) {
            check(&format!("{} {}", pair[0], pair[1]));
        }
        for triple in tokens.windows(3) {
            check(&format!("{} {} {}", triple[0], triple[1], triple[2]));
        }
        out
    }
}

// ---------------------------------------------------------------------
// Salary
// ---------------------------------------------------------------------

const KNOWN_CODES: [&str; 8] = ["USD", "EUR", "GBP", "CZK", "CAD", "AUD", "CHF", "JPY"];

fn currency_for_symbol(sym: &str) -> Option<&'static str> {
    match sym {
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        _ => None,
    }
}

fn parse_amount(raw: &str, k: bool) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let v: f64 = cleaned.parse().ok()?;
    let v = if k { v * 1000.0 } else { v };
    if !(100.0..=100_000_000.0).contains(&v) {
        return None;
    }
    Some(v.round() as u64)
}

/// Parse salary text in its common scraped shapes: `$80k-$120k`,
/// `80,000 - 120,000 USD`, `€70k`, single values. Returns `None` rather
/// than an error when nothing parses; currency falls back to the
/// source's declared locale or "unknown".
pub fn parse_salary(text: &str, source_default: Option<&str>) -> Option<SalaryRange> {
    static RE_RANGE: OnceCell<Regex> = OnceCell::new();
    let re_range = RE_RANGE.get_or_init(|| {
        Regex::new(
            r"(?ix)
            (?P<cur1>[$€£])?\s*
            (?P<min>\d[\d,]*(?:\.\d+)?)\s*(?P<k1>k)?
            \s*(?:-|–|—|\bto\b)\s*
            (?P<cur2>[$€£])?\s*
            (?P<max>\d[\d,]*(?:\.\d+)?)\s*(?P<k2>k)?
            (?:\s*(?P<code>[A-Za-z]{3}))?",
        )
        .unwrap()
    });
    static RE_SINGLE: OnceCell<Regex> = OnceCell::new();
    let re_single = RE_SINGLE.get_or_init(|| {
        // Single values require an explicit currency symbol or code so
        // that "401k plan" never parses as a salary.
        Regex::new(
            r"(?ix)
            (?:(?P<cur>[$€£])\s*(?P<val>\d[\d,]*(?:\.\d+)?)\s*(?P<k>k)?
             | (?P<val2>\d[\d,]*(?:\.\d+)?)\s*(?P<k2>k)?\s*(?P<code>USD|EUR|GBP|CZK|CAD|AUD|CHF|JPY))",
        )
        .unwrap()
    });

    let fallback = || {
        source_default
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| "unknown".to_string())
    };

    if let Some(caps) = re_range.captures(text) {
        let k1 = caps.name("k1").is_some();
        let k2 = caps.name("k2").is_some();
        // "$80k-120" almost always means "$80k-$120k"
        let k1 = k1 || (!k1 && k2);
        let min = parse_amount(caps.name("min")?.as_str(), k1);
        let max = parse_amount(caps.name("max")?.as_str(), k2 || k1);

        let code = caps
            .name("code")
            .map(|m| m.as_str().to_ascii_uppercase())
            .filter(|c| KNOWN_CODES.contains(&c.as_str()));
        let symbol = caps
            .name("cur1")
            .or_else(|| caps.name("cur2"))
            .and_then(|m| currency_for_symbol(m.as_str()))
            .map(str::to_string);

        if let (Some(mut lo), Some(mut hi)) = (min, max) {
            if lo > hi {
                std::mem::swap(&mut lo, &mut hi);
            }
            let has_signal = code.is_some() || symbol.is_some();
            // Bare numeric ranges need plausible magnitudes; "9-5 shift"
            // must not become a salary.
            if has_signal || lo >= 10_000 {
                let currency = code.or(symbol).unwrap_or_else(fallback);
                return Some(SalaryRange {
                    min: Some(lo),
                    max: Some(hi),
                    currency,
                });
            }
        }
    }

    if let Some(caps) = re_single.captures(text) {
        let (val, k, currency) = if let Some(v) = caps.name("val") {
            let cur = caps
                .name("cur")
                .and_then(|m| currency_for_symbol(m.as_str()))
                .map(str::to_string);
            (v.as_str(), caps.name("k").is_some(), cur)
        } else {
            let cur = caps.name("code").map(|m| m.as_str().to_ascii_uppercase());
            (caps.name("val2")?.as_str(), caps.name("k2").is_some(), cur)
        };
        if let Some(v) = parse_amount(val, k) {
            if v >= 1_000 {
                return Some(SalaryRange {
                    min: Some(v),
                    max: Some(v),
                    currency: currency.unwrap_or_else(fallback),
                });
            }
        }
    }

    None
}

// ---------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------

/// Converts heterogeneous raw postings into the canonical schema.
/// Constructed once and injected where needed; holds no mutable state.
#[derive(Debug, Clone)]
pub struct Normalizer {
    locations: LocationTable,
    vocab: TechVocabulary,
    /// source → declared locale currency (from config)
    source_currencies: HashMap<String, String>,
}

impl Normalizer {
    pub fn new(
        locations: LocationTable,
        vocab: TechVocabulary,
        source_currencies: HashMap<String, String>,
    ) -> Self {
        Self {
            locations,
            vocab,
            source_currencies,
        }
    }

    pub fn with_seed_data(source_currencies: HashMap<String, String>) -> Self {
        Self::new(
            LocationTable::default_seed(),
            TechVocabulary::default_seed(),
            source_currencies,
        )
    }

    /// Normalize one raw posting. Fails only when the title or company
    /// is empty after trimming; every other field degrades gracefully.
    pub fn normalize(&self, posting: &RawPosting) -> Result<CanonicalFields> {
        let (title, title_remote) = strip_title_remote(&tidy(&posting.title));
        let company = tidy(&posting.company);

        if title.is_empty() {
            return Err(Error::MalformedPosting("empty title".into()));
        }
        if company.is_empty() {
            return Err(Error::MalformedPosting("empty company".into()));
        }

        let mut location = self.locations.parse(&posting.location_text);
        if title_remote || detects_remote(&posting.title) {
            location.remote = true;
        }

        let description = clean_description(&posting.description);
        let tech_stack = self.vocab.extract(&description);
        let salary = parse_salary(
            &description,
            self.source_currencies.get(&posting.source).map(String::as_str),
        );

        Ok(CanonicalFields {
            title,
            company,
            location,
            tech_stack,
            salary,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn posting(title: &str, company: &str, location: &str, desc: &str) -> RawPosting {
        RawPosting {
            source: "boardx".into(),
            native_id: Some("1".into()),
            title: title.into(),
            company: company.into(),
            location_text: location.into(),
            description: desc.into(),
            url: None,
            posted_at: Utc::now(),
            scraped_at: Utc::now(),
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::with_seed_data(HashMap::new())
    }

    #[test]
    fn empty_title_or_company_is_malformed() {
        let n = normalizer();
        assert!(matches!(
            n.normalize(&posting("   ", "Acme", "", "")),
            Err(Error::MalformedPosting(_))
        ));
        assert!(matches!(
            n.normalize(&posting("Engineer", "  \t ", "", "")),
            Err(Error::MalformedPosting(_))
        ));
    }

    #[test]
    fn remote_suffix_is_stripped_from_title() {
        let n = normalizer();
        let f = n
            .normalize(&posting("Backend Engineer, Remote", "Acme", "", ""))
            .unwrap();
        assert_eq!(f.title, "Backend Engineer");
        assert!(f.location.remote);

        let f = n
            .normalize(&posting("Backend Engineer (Remote)", "Acme", "", ""))
            .unwrap();
        assert_eq!(f.title, "Backend Engineer");
        assert!(f.location.remote);
    }

    #[test]
    fn location_table_fills_region_and_country() {
        let loc = LocationTable::default_seed().parse("Berlin, Germany");
        assert_eq!(loc.city.as_deref(), Some("berlin"));
        assert_eq!(loc.country.as_deref(), Some("de"));
        assert!(!loc.remote);
    }

    #[test]
    fn remote_is_detected_independently_of_city() {
        let loc = LocationTable::default_seed().parse("Remote (Prague)");
        assert!(loc.remote);
        assert_eq!(loc.city.as_deref(), Some("prague"));
    }

    #[test]
    fn fuzzy_city_lookup_absorbs_typos() {
        let loc = LocationTable::default_seed().parse("San Fransisco, USA");
        assert_eq!(loc.city.as_deref(), Some("san francisco"));
        assert_eq!(loc.region.as_deref(), Some("california"));
    }

    #[test]
    fn unknown_location_degrades_to_empty() {
        let loc = LocationTable::default_seed().parse("Somewhere Nice");
        assert_eq!(loc.city, None);
        assert_eq!(loc.region, None);
        assert!(!loc.remote);
    }

    #[test]
    fn tags_are_word_boundary_and_alias_aware() {
        let v = TechVocabulary::default_seed();
        let tags = v.extract("We use Golang, k8s and PostgreSQL. Scala-free zone, no Scalability issues.");
        assert!(tags.contains("go"));
        assert!(tags.contains("kubernetes"));
        assert!(tags.contains("postgres"));
        // "Scalability" must not match "scala" — but "Scala-free" tokenizes
        // to "scala" on the word boundary, which is a legitimate mention.
        assert!(tags.contains("scala"));
        assert!(!tags.contains("javascript"));
    }

    #[test]
    fn tags_handle_dotted_and_bigram_entries() {
        let v = TechVocabulary::default_seed();
        let tags = v.extract("Stack: Node.js, React Native and Ruby on Rails.");
        assert!(tags.contains("node.js"));
        assert!(tags.contains("react native"));
        assert!(tags.contains("rails"));
    }

    #[test]
    fn salary_dollar_k_range() {
        let s = parse_salary("$80k-$120k", None).unwrap();
        assert_eq!(s.min, Some(80_000));
        assert_eq!(s.max, Some(120_000));
        assert_eq!(s.currency, "USD");
    }

    #[test]
    fn salary_spelled_out_range_with_code() {
        let s = parse_salary("80,000 - 120,000 USD", None).unwrap();
        assert_eq!(s.min, Some(80_000));
        assert_eq!(s.max, Some(120_000));
        assert_eq!(s.currency, "USD");
    }

    #[test]
    fn salary_single_value_with_symbol() {
        let s = parse_salary("up to €95k per year", None).unwrap();
        // "up to" ranges collapse to a single value
        assert_eq!(s.max, Some(95_000));
        assert_eq!(s.currency, "EUR");
    }

    #[test]
    fn salary_defaults_to_source_locale_currency() {
        let s = parse_salary("90,000 - 110,000 annually", Some("czk")).unwrap();
        assert_eq!(s.currency, "CZK");
    }

    #[test]
    fn salary_without_currency_signal_is_unknown() {
        let s = parse_salary("50,000 - 70,000", None).unwrap();
        assert_eq!(s.currency, "unknown");
    }

    #[test]
    fn unparseable_salary_is_none_not_error() {
        assert_eq!(parse_salary("competitive compensation", None), None);
        assert_eq!(parse_salary("401k plan and benefits", None), None);
        assert_eq!(parse_salary("9-5 shift", None), None);
    }

    #[test]
    fn description_is_html_cleaned() {
        let out = clean_description("<p>Senior&nbsp;Engineer</p>\n\n<ul><li>Go</li></ul>");
        assert_eq!(out, "Senior Engineer Go");
    }

    #[test]
    fn company_fold_drops_legal_suffixes() {
        assert_eq!(fold_company("Acme Inc."), "acme");
        assert_eq!(fold_company("Acme Corp"), "acme");
        assert_eq!(fold_company("  ACME  "), "acme");
        // never fold away the whole name
        assert_eq!(fold_company("Ltd"), "ltd");
    }
}
