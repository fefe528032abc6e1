//! Dataset import from exam-booklet text.
//!
//! Text extracted from a booklet of numbered problems is split at the
//! problem numbers, cleaned of extraction debris, rewritten into
//! `$`-delimited LaTeX and tagged with a category and a difficulty. The
//! resulting records can be merged into an existing dataset.
//!
//! Cleaning runs in this order:
//! - [`ARTIFACT_RULES`]: page headers, footers and notices
//! - [`SYMBOL_RULES`] and [`UNICODE_ARTIFACTS`]: font-encoding symbols to
//!   LaTeX, then leftover debris characters dropped
//! - [`NOTATION_RULES`]: broken command prefixes, integral bounds, `p` for `\pi`
//! - [`wrap_math_expressions`]: bare LaTeX wrapped in `$...$`
//! - [`GLUE_RULES`]: words glued to a `$` delimiter pulled apart
//! - [`format_choices`]: one answer choice per line under `Choices:`

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use super::problems::{Difficulty, ProblemId, ProblemRecord, ProblemSet};
use crate::core::rules::{apply_all, RewriteRule};
use crate::utils::error::{TutorError, TutorResult};

/// Category of a problem no keyword matched.
pub const DEFAULT_CATEGORY: &str = "Mathematics";

/// Label separating the statement from its answer choices.
pub const CHOICES_LABEL: &str = "Choices:";

const MIN_PROBLEM_CHARS: usize = 10;
const MAX_PROBLEM_CHARS: usize = 5000;
const MIN_CHOICES: usize = 2;
const MAX_CHOICES: usize = 8;

/// Category keywords, matched as lowercase substrings. First category with a
/// hit wins.
pub static CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Complex Analysis",
        &[
            "complex", "analytic", "residue", "contour", "holomorphic", "meromorphic", "cauchy",
            "laurent", "pole", "singularity",
        ],
    ),
    (
        "Real Analysis",
        &[
            "sequence", "series", "convergence", "uniform", "pointwise", "monotone", "bounded",
            "supremum", "infimum", "riemann",
        ],
    ),
    (
        "Abstract Algebra",
        &[
            "group", "ring", "field", "permutation", "conjugacy", "homomorphism", "isomorphism",
            "subgroup", "coset", "quotient", "galois",
        ],
    ),
    (
        "Linear Algebra",
        &[
            "matrix", "vector", "linear", "eigenvalue", "determinant", "span", "basis",
            "dimension", "null space", "rank", "orthogonal",
        ],
    ),
    (
        "Number Theory",
        &[
            "prime", "modulo", "integer", "gcd", "congruent", "divisible", "fibonacci", "fermat",
            "euclidean", "diophantine",
        ],
    ),
    (
        "Topology",
        &[
            "topology", "metric", "space", "open", "closed", "compact", "connected",
            "homeomorphism", "continuous", "hausdorff",
        ],
    ),
    (
        "Graph Theory",
        &[
            "graph", "vertex", "edge", "tree", "cycle", "path", "connected", "planar",
            "chromatic", "spanning",
        ],
    ),
    (
        "Probability",
        &[
            "probability", "random", "sample", "distribution", "expected", "variance", "normal",
            "binomial", "poisson", "bayes",
        ],
    ),
    (
        "Statistics",
        &[
            "sample", "population", "hypothesis", "test", "confidence", "correlation",
            "regression", "anova", "chi-square",
        ],
    ),
    (
        "Calculus",
        &[
            "integral", "derivative", "limit", "continuity", "differential", "partial",
            "gradient", "divergence", "curl", "laplacian",
        ],
    ),
    (
        "Differential Equations",
        &[
            "differential equation", "ode", "pde", "laplace", "fourier", "initial value",
            "boundary value", "separable",
        ],
    ),
    (
        "Geometry",
        &[
            "triangle", "circle", "angle", "area", "volume", "radius", "polygon", "sphere",
            "cylinder", "cone", "ellipse",
        ],
    ),
    (
        "Functions",
        &[
            "function", "domain", "range", "composition", "inverse", "bijective", "injective",
            "surjective", "mapping",
        ],
    ),
    (
        "Discrete Mathematics",
        &[
            "combinatorics", "permutation", "combination", "recursive", "recurrence",
            "generating function", "inclusion-exclusion",
        ],
    ),
];

/// Wording that overrides the problem-number difficulty, hardest first.
pub static COMPLEXITY_INDICATORS: &[(Difficulty, &[&str])] = &[
    (
        Difficulty::Hard,
        &[
            "theorem", "proof", "if and only if", "necessary and sufficient", "topology",
            "abstract", "homomorphism", "isomorphism", "measure theory", "lebesgue",
            "functional analysis",
        ],
    ),
    (
        Difficulty::Medium,
        &[
            "derivative", "integral", "matrix", "vector", "convergence", "continuous",
            "differentiable", "optimization", "eigenvalue",
        ],
    ),
    (
        Difficulty::Easy,
        &[
            "compute", "calculate", "find", "what is", "evaluate", "solve", "determine", "basic",
            "simple",
        ],
    ),
];

/// Difficulty by inclusive problem-number range. Numbers outside every
/// range are `Medium`.
pub static DIFFICULTY_BY_NUMBER: &[(u64, u64, Difficulty)] = &[
    (1, 20, Difficulty::Easy),
    (21, 45, Difficulty::Medium),
    (46, 100, Difficulty::Hard),
];

/// Font-encoding symbols and their LaTeX, in application order.
pub static SYMBOL_REPLACEMENTS: &[(&str, &str)] = &[
    // big operators
    ("Ú", r"\int"),
    ("Â", r"\sum"),
    ("∏", r"\prod"),
    // greek
    ("π", r"\pi"),
    ("α", r"\alpha"),
    ("β", r"\beta"),
    ("γ", r"\gamma"),
    ("δ", r"\delta"),
    ("ε", r"\varepsilon"),
    ("θ", r"\theta"),
    ("λ", r"\lambda"),
    ("μ", r"\mu"),
    ("σ", r"\sigma"),
    ("φ", r"\phi"),
    ("ω", r"\omega"),
    // relations
    ("≥", r"\geq"),
    ("≤", r"\leq"),
    ("≠", r"\neq"),
    ("≈", r"\approx"),
    ("≡", r"\equiv"),
    ("∼", r"\sim"),
    // sets
    ("∈", r"\in"),
    ("∉", r"\notin"),
    ("⊂", r"\subset"),
    ("⊆", r"\subseteq"),
    ("∪", r"\cup"),
    ("∩", r"\cap"),
    ("∅", r"\emptyset"),
    ("˜", r"\mathbb{R}"),
    ("È", r"\cup"),
    ("Ç", r"\cap"),
    ("Ã", r"\subset"),
    ("Œ", r"\in"),
    (r"Æ\mathbb{R}", r"\to \mathbb{R}"),
    ("ı", "i"),
    // other
    ("•", r"\infty"),
    ("¤", r"\times"),
    ("æ", r"\sqrt"),
    ("±", r"\pm"),
    ("∓", r"\mp"),
    ("∇", r"\nabla"),
    ("∂", r"\partial"),
    // arrows
    ("→", r"\rightarrow"),
    ("←", r"\leftarrow"),
    ("↔", r"\leftrightarrow"),
    ("⇒", r"\Rightarrow"),
    ("⇐", r"\Leftarrow"),
    ("⇔", r"\Leftrightarrow"),
];

/// Accented debris left by the booklet fonts, dropped after symbol
/// replacement.
pub static UNICODE_ARTIFACTS: &[char] = &[
    'Ê', 'Á', 'ˆ', 'Ô', 'Õ', 'Ö', '×', 'Ø', 'Ù', 'Ú', 'Û', 'Ü', 'Ý', 'Þ', 'ß', 'à', 'á', 'â',
    'ã', 'ä', 'å', 'æ', 'ç', 'è', 'é', 'ê', 'ë', 'ì', 'í', 'î', 'ï', 'ð', 'ñ', 'ò', 'ó', 'ô',
    'õ', 'ö', '÷', 'ø', 'ù', 'ú', 'û', 'ü', 'ý', 'þ', 'ÿ',
];

/// Bare LaTeX wrapped in `$...$` when a problem has no math delimiters yet.
/// Alternatives are tried left to right at each position, so a fraction
/// swallows the symbols inside it.
const BARE_MATH_PATTERNS: &[&str] = &[
    r"\\frac\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}",
    r"\\sqrt\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}",
    r"\\int[^$\n]*?\bd[a-z]\b",
    r"\\(?:sin|cos|tan)(?:\^[0-9]+)?(?:\s*(?:\\[a-zA-Z]+|[a-zA-Z]\b))?",
    r"\\(?:pi|alpha|beta|gamma|delta|theta|lambda|mu|sigma|phi|omega)\b",
    r"\\(?:leq|geq|neq|approx|equiv|infty|int|in|subset|cup|cap)\b",
    r"\\mathbb\{[RQNCZH]\}",
];

lazy_static! {
    /// Booklet page furniture, removed first.
    pub static ref ARTIFACT_RULES: Vec<RewriteRule> = vec![
        RewriteRule::new("booklet-footer", r"(?i)GRE.*?Practice.*?Book.*?Page.*?\d+", ""),
        RewriteRule::new("page-number", r"(?im)\d+\s*Page\b.*?$", ""),
        RewriteRule::new("booklet-title", r"(?i)Practice Book", ""),
        RewriteRule::new("test-title", r"(?i)Mathematics Test", ""),
        RewriteRule::new("publisher", r"(?i)Educational Testing Service", ""),
        RewriteRule::new("copyright", r"(?i)Copyright.*?\d{4}", ""),
        RewriteRule::new("bound-placeholders", r"\$\d+_\$\d+", ""),
        RewriteRule::new("copy-notice", r"(?im)Unauthorized copying or reuse of.*?$", ""),
        RewriteRule::new("illegal-notice", r"(?im)any part of this page is illegal.*?$", ""),
        RewriteRule::new("next-page", r"(?im)GO ON TO THE NEXT PAGE.*?$", ""),
        RewriteRule::new("page-footer", r"(?i)GRE.*?Page.*?\d+", ""),
        RewriteRule::new("duplicate-choices-label", r"(?i)Choices:\s*Choices:", "Choices:"),
    ];

    pub static ref SYMBOL_RULES: Vec<RewriteRule> = SYMBOL_REPLACEMENTS
        .iter()
        .map(|&(from, to)| RewriteRule::literal(from, from, to))
        .collect();

    /// Repairs for notation the extractor mangled, in application order.
    pub static ref NOTATION_RULES: Vec<RewriteRule> = vec![
        // `(cid:N)` glyph codes
        RewriteRule::new("cid-drop", r"\(?cid:(?:11|12|94|96|135|144|199)\)?", ""),
        RewriteRule::new("cid-equals", r"\(?cid:32\)?", " = "),
        RewriteRule::new("cid-geq", r"\(?cid:149\)?", r"\geq"),
        RewriteRule::new("cid-plus", r"\(?cid:14\)?", "+"),
        // integral bounds
        RewriteRule::literal("int-unit-bounds", r"\int \$1", r"\int_0^1"),
        RewriteRule::literal("int-dollar-bound", r"\int \$", r"\int_"),
        RewriteRule::new("int-infinity", r"\\int\s*\\infty", r"\int_0^{\infty}"),
        RewriteRule::new("int-upper-bound", r"\\int\s*(\d+)", r"\int_0^{${1}}"),
        // `p` standing in for `\pi`
        RewriteRule::new("sin-p", r"(^|[^\\\w])sin? p\b", r"${1}\sin \pi"),
        RewriteRule::new("cos-p", r"(^|[^\\\w])cos? p\b", r"${1}\cos \pi"),
        RewriteRule::new("tan-p", r"(^|[^\\\w])tan p\b", r"${1}\tan \pi"),
        RewriteRule::new("log-prefix", r"(^|[^\\\w])lo ", r"${1}\log "),
        RewriteRule::new("ln-prefix", r"(^|[^\\\w])ln ", r"${1}\ln "),
        RewriteRule::new("p-word", r"(^|\s)p(\s)", r"${1}\pi${2}"),
        RewriteRule::new("p-dollar", r"\$p\b|\bp\$", r"\pi"),
        RewriteRule::new("p-close-paren", r"\bp\)", r"\pi)"),
        RewriteRule::new("p-open-paren", r"\(p\b", r"(\pi"),
        // command names that lost their backslash
        RewriteRule::new("command-prefix", r"(^|[^\\\w])(frac|sqrt)\{", r"${1}\${2}{"),
        RewriteRule::new("limit-prefix", r"(^|[^\\\w])(sum|prod|lim)_\{", r"${1}\${2}_{"),
        // relations from the symbol font
        RewriteRule::new(
            "leq-chain",
            r"(\d+)\s*£\s*(\w+)\s*£\s*(\d+)",
            r"${1} \leq ${2} \leq ${3}",
        ),
        RewriteRule::new("leq-bracket", r"£\s*(\w+)\s*£", r"\leq ${1} \leq"),
        RewriteRule::literal("leq", "£", r"\leq"),
        RewriteRule::literal("geq", "³", r"\geq"),
        RewriteRule::literal("neq", "¢", r"\neq"),
        RewriteRule::new(
            "double-backslash",
            r"\\\\(frac|sum|int|lim|log|ln|sqrt)",
            r"\${1}",
        ),
    ];

    /// Nested or split `$` spans left by earlier passes.
    pub static ref MALFORMED_MATH_RULES: Vec<RewriteRule> = vec![
        RewriteRule::new(
            "frac-sqrt-pi",
            r"\$\\frac\{\$\\sqrt\{\$\\pi\$\}\$\}\{([^}]+)\}\$",
            r"$$\frac{\sqrt{\pi}}{${1}}$$",
        ),
        RewriteRule::new(
            "coefficient-sqrt-pi",
            r"(\d)\$\\sqrt\{\$\\pi\$\}\$",
            r"$$${1}\sqrt{\pi}$$",
        ),
        RewriteRule::new("sqrt-pi", r"\$\\sqrt\{\$\\pi\$\}\$", r"$$\sqrt{\pi}$$"),
        RewriteRule::new(
            "int-both-infinite",
            r"\$\\int_\$\{-\$\\in\$fty\}\^\{\$\\in\$fty\}",
            r"$$\int_{-\infty}^{\infty}$$",
        ),
        RewriteRule::new(
            "int-to-infinity",
            r"\$\\int_\$\{([^}$]*)\}\^\{\$\\in\$fty\}",
            r"$$\int_{${1}}^{\infty}$$",
        ),
        RewriteRule::new("frac-pi", r"\$\\frac\{\$\\pi\$\}\{([^}]+)\}\$", r"$$\frac{\pi}{${1}}$$"),
        RewriteRule::new("trig-cube", r"\$\\(cos|sin)\$\^3", r"$$\${1}^3"),
        RewriteRule::new("dollar-runs", r"\${2,}", "$$"),
    ];

    /// Words glued to a math delimiter.
    pub static ref GLUE_RULES: Vec<RewriteRule> = vec![
        RewriteRule::new("let-math", r"Let\$", "Let $$"),
        RewriteRule::new("math-denote", r"\$denote", "$$ denote"),
        RewriteRule::new("math-and-math", r"\$and\$", "$$ and $$"),
        RewriteRule::new("math-be", r"\$be", "$$ be"),
        RewriteRule::new("math-satisfies", r"\$satisfies", "$$ satisfies"),
        RewriteRule::new("math-for-math", r"\$for\$", "$$ for $$"),
        RewriteRule::new("math-is", r"\$is", "$$ is"),
        RewriteRule::new("math-are", r"\$are", "$$ are"),
        RewriteRule::new("then-math", r"then\$", "then $$"),
        RewriteRule::new("will-math", r"will\$", "will $$"),
        RewriteRule::new("on-math", r"on\$", "on $$"),
        RewriteRule::new("to-math", r"to\$", "to $$"),
    ];

    /// Layout of the section after `Choices:`.
    pub static ref CHOICE_RULES: Vec<RewriteRule> = vec![
        RewriteRule::new("bare-choice-marker", r"(^|\s)([A-E])\)\s*", "${1}(${2}) "),
        RewriteRule::new("choice-line-break", r"\s*\(([A-E])\)\s*", "\n(${1}) "),
        RewriteRule::new("choice-blank-lines", r"\n\s*\n", "\n"),
    ];

    static ref DUPLICATE_CHOICES_LABEL: RewriteRule =
        RewriteRule::new("duplicate-choices-label", r"Choices:\s*Choices:\s*", "Choices:\n");

    static ref CLEANUP_RULES: Vec<RewriteRule> = vec![
        RewriteRule::new("collapse-blanks", r"[ \t]+", " "),
        RewriteRule::new("trim-line-ends", r" ?\n ?", "\n"),
        RewriteRule::new("collapse-paragraphs", r"\n{3,}", "\n\n"),
    ];

    static ref BARE_MATH: Regex = Regex::new(
        &BARE_MATH_PATTERNS
            .iter()
            .map(|p| format!("(?:{})", p))
            .collect::<Vec<_>>()
            .join("|")
    )
    .expect("valid bare math pattern");

    static ref CHOICE_MARKER: Regex = Regex::new(r"\(([A-E])\)").expect("valid choice pattern");
    static ref PROBLEM_START: Regex =
        Regex::new(r"^\s*(\d+)\.(?:\s|$)").expect("valid problem number pattern");
    static ref PROBLEM_NUMBER: Regex =
        Regex::new(r"^\s*\d+\.\s*").expect("valid problem number pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace pattern");
}

/// Splits booklet text into problem records.
#[derive(Debug, Clone, Copy)]
pub struct ProblemImporter {
    start_problem: u64,
}

impl Default for ProblemImporter {
    fn default() -> Self {
        Self { start_problem: 1 }
    }
}

/// Result of [`ProblemImporter::import`].
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// The full dataset to write, existing records included.
    pub problems: Vec<ProblemRecord>,
    pub imported: usize,
    pub refined: usize,
}

impl ProblemImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip problems numbered below `start_problem`.
    pub fn with_start_problem(mut self, start_problem: u64) -> Self {
        self.start_problem = start_problem;
        self
    }

    /// Split `text` at lines starting with `N.` and parse each chunk.
    pub fn parse_problems(&self, text: &str) -> Vec<ProblemRecord> {
        let lines: Vec<&str> = text.lines().collect();
        let starts: Vec<(u64, usize)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let caps = PROBLEM_START.captures(line)?;
                let number: u64 = caps[1].parse().ok()?;
                (number >= self.start_problem).then_some((number, i))
            })
            .collect();
        info!(
            count = starts.len(),
            start = self.start_problem,
            "problem boundaries found"
        );

        starts
            .iter()
            .enumerate()
            .map(|(k, &(number, first))| {
                let end = starts.get(k + 1).map_or(lines.len(), |&(_, next)| next);
                let record = parse_single_problem(number, &lines[first..end].join("\n"));
                for issue in validate_problem(&record) {
                    warn!(number, %issue, "imported problem failed validation");
                }
                debug!(number, category = %record.category, difficulty = %record.difficulty, "parsed problem");
                record
            })
            .collect()
    }

    /// Parse, post-process and merge into the dataset at `existing`.
    pub fn import(&self, text: &str, existing: Option<&Path>) -> TutorResult<ImportOutcome> {
        let mut problems = self.parse_problems(text);
        if problems.is_empty() {
            return Err(TutorError::dataset(format!(
                "no numbered problems found from problem {}",
                self.start_problem
            )));
        }
        let refined = post_process(&mut problems);
        let imported = problems.len();
        let problems = merge_with_existing(problems, existing)?;
        Ok(ImportOutcome {
            problems,
            imported,
            refined,
        })
    }
}

/// Build a record from one problem's raw text, number prefix included.
pub fn parse_single_problem(number: u64, text: &str) -> ProblemRecord {
    let text = WHITESPACE.replace_all(text, " ");
    let text = PROBLEM_NUMBER.replace(text.trim(), "").into_owned();

    let category = determine_category(&text);
    let difficulty = determine_difficulty(number, &text);
    let statement = match split_choices(&text) {
        Some((problem, choices)) => {
            format!("{}\n\n{}\n{}", problem, CHOICES_LABEL, choices.join("\n"))
        }
        None => text.clone(),
    };

    ProblemRecord::new(
        ProblemId::Number(number),
        category,
        difficulty,
        clean_problem_text(&statement),
    )
}

/// Statement before the first `(A)`-style marker, and each non-empty choice
/// as `(X) text`. Only the first occurrence of a letter counts.
fn split_choices(text: &str) -> Option<(&str, Vec<String>)> {
    let markers: Vec<_> = CHOICE_MARKER.captures_iter(text).collect();
    let first = markers.first()?.get(0)?;
    let problem = text[..first.start()].trim();
    if problem.is_empty() {
        return None;
    }

    let mut seen = Vec::new();
    let mut choices = Vec::new();
    for (k, caps) in markers.iter().enumerate() {
        let (Some(marker), Some(letter)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = markers
            .get(k + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let body = text[marker.end()..end].trim();
        if body.is_empty() || seen.contains(&letter.as_str()) {
            continue;
        }
        seen.push(letter.as_str());
        choices.push(format!("({}) {}", letter.as_str(), body));
    }

    (!choices.is_empty()).then_some((problem, choices))
}

/// First category whose keywords occur in `text`.
pub fn determine_category(text: &str) -> String {
    let lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(DEFAULT_CATEGORY, |(category, _)| *category)
        .to_string()
}

pub fn difficulty_for_number(number: u64) -> Difficulty {
    DIFFICULTY_BY_NUMBER
        .iter()
        .find(|(start, end, _)| (*start..=*end).contains(&number))
        .map_or(Difficulty::Medium, |&(_, _, difficulty)| difficulty)
}

/// Content indicators first, then the problem-number band.
pub fn determine_difficulty(number: u64, text: &str) -> Difficulty {
    let lower = text.to_lowercase();
    COMPLEXITY_INDICATORS
        .iter()
        .find(|(_, indicators)| indicators.iter().any(|i| lower.contains(i)))
        .map_or_else(|| difficulty_for_number(number), |&(difficulty, _)| difficulty)
}

/// Full cleaning pass over one problem statement.
pub fn clean_problem_text(text: &str) -> String {
    let text = apply_all(&ARTIFACT_RULES, text);
    let text = replace_symbols(&text);
    let text = apply_all(&NOTATION_RULES, &text);
    let text = wrap_math_expressions(&text);
    let text = apply_all(&GLUE_RULES, &text);
    let text = format_choices(&text);
    collapse_whitespace(&text)
}

/// Map font symbols to LaTeX, then drop leftover debris characters.
pub fn replace_symbols(text: &str) -> String {
    apply_all(&SYMBOL_RULES, text)
        .chars()
        .filter(|c| !UNICODE_ARTIFACTS.contains(c))
        .collect()
}

/// Wrap bare LaTeX in `$...$`.
///
/// Text that already has a `$` only gets its malformed spans repaired.
pub fn wrap_math_expressions(text: &str) -> String {
    if text.contains('$') {
        return apply_all(&MALFORMED_MATH_RULES, text);
    }
    BARE_MATH.replace_all(text, "$$${0}$$").into_owned()
}

/// Put each answer choice on its own line under a single `Choices:` label.
///
/// Without a label, two or more `(A)`-style markers start the section.
pub fn format_choices(text: &str) -> String {
    let text = DUPLICATE_CHOICES_LABEL.apply(text);
    if let Some((problem, choices)) = text.split_once(CHOICES_LABEL) {
        return choices_section(problem, choices);
    }

    if let Some((problem, choices)) = split_choices(&text).filter(|(_, c)| c.len() >= 2) {
        return format!("{}\n\n{}\n{}", problem, CHOICES_LABEL, choices.join("\n"));
    }
    text
}

fn choices_section(problem: &str, choices: &str) -> String {
    let choices = apply_all(&CHOICE_RULES, choices.trim());
    format!("{}\n\n{}\n{}", problem.trim(), CHOICES_LABEL, choices.trim())
}

fn collapse_whitespace(text: &str) -> String {
    apply_all(&CLEANUP_RULES, text.trim()).trim().to_string()
}

/// Problems whose statement fails the length or choice-count limits.
pub fn validate_problem(problem: &ProblemRecord) -> Vec<String> {
    let mut issues = Vec::new();
    if problem.category.trim().is_empty() {
        issues.push("Missing required field: category".to_string());
    }

    let length = problem.problem.chars().count();
    if length < MIN_PROBLEM_CHARS {
        issues.push(format!("Problem too short: {} chars", length));
    } else if length > MAX_PROBLEM_CHARS {
        issues.push(format!("Problem too long: {} chars", length));
    }

    if let Some(choices) = &problem.choices {
        if choices.len() < MIN_CHOICES {
            issues.push(format!("Too few choices: {}", choices.len()));
        } else if choices.len() > MAX_CHOICES {
            issues.push(format!("Too many choices: {}", choices.len()));
        }
    }
    issues
}

/// Last pass over parsed problems. Returns how many statements changed.
pub fn post_process(problems: &mut [ProblemRecord]) -> usize {
    let mut refined = 0;
    for problem in problems.iter_mut().filter(|p| !p.problem.is_empty()) {
        let fixed = finalize_problem_text(&problem.problem);
        if fixed != problem.problem {
            debug!(id = %problem.id, "post-processing refined problem");
            problem.problem = fixed;
            refined += 1;
        }
    }
    info!(refined, "post-processing completed");
    refined
}

fn finalize_problem_text(text: &str) -> String {
    let text = DUPLICATE_CHOICES_LABEL.apply(text);
    let text = apply_all(&GLUE_RULES, &text);
    let text = match text.split_once(CHOICES_LABEL) {
        Some((problem, choices)) => choices_section(problem, choices),
        None => text,
    };
    collapse_whitespace(&text)
}

/// Existing and imported records sorted by id. An imported record replaces
/// an existing one with the same id.
pub fn merge_problems(
    existing: Vec<ProblemRecord>,
    imported: Vec<ProblemRecord>,
) -> Vec<ProblemRecord> {
    let mut merged: IndexMap<ProblemId, ProblemRecord> = existing
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();
    for problem in imported {
        let id = problem.id.clone();
        if merged.insert(id.clone(), problem).is_some() {
            debug!(%id, "imported problem replaces existing one");
        }
    }

    let mut merged: Vec<ProblemRecord> = merged.into_values().collect();
    merged.sort_by(|a, b| a.id.cmp(&b.id));
    merged
}

/// Merge with the dataset at `existing`. A path that does not exist yet
/// leaves the imported records as they are.
pub fn merge_with_existing(
    imported: Vec<ProblemRecord>,
    existing: Option<&Path>,
) -> TutorResult<Vec<ProblemRecord>> {
    let Some(path) = existing else {
        return Ok(imported);
    };
    if !path.exists() {
        warn!(path = %path.display(), "existing dataset not found, keeping imported problems only");
        return Ok(imported);
    }

    let current = ProblemSet::load(path)?;
    info!(count = current.len(), "loaded existing problems");
    Ok(merge_problems(current.iter().cloned().collect(), imported))
}

/// Write `problems` as pretty-printed JSON.
pub fn save_problems(problems: &[ProblemRecord], path: &Path) -> TutorResult<()> {
    let json = serde_json::to_string_pretty(problems)
        .map_err(|e| TutorError::dataset(format!("cannot serialize problems: {}", e)))?;
    fs::write(path, json + "\n")
        .map_err(|e| TutorError::dataset(format!("cannot write {}: {}", path.display(), e)))?;
    info!(count = problems.len(), path = %path.display(), "problems saved");
    Ok(())
}

/// Text of every page of a PDF booklet.
#[cfg(all(feature = "pdf", not(target_arch = "wasm32")))]
pub fn extract_pdf_text(path: &Path) -> TutorResult<String> {
    // pdf-extract panics on some malformed files
    let owned = path.to_path_buf();
    let result =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| pdf_extract::extract_text(&owned)));

    match result {
        Ok(Ok(text)) => {
            debug!(chars = text.len(), "PDF text extracted");
            Ok(text)
        }
        Ok(Err(e)) => Err(TutorError::dataset(format!(
            "PDF extraction failed for {}: {}",
            path.display(),
            e
        ))),
        Err(_) => Err(TutorError::dataset(format!(
            "PDF extraction panicked on {} (malformed PDF)",
            path.display()
        ))),
    }
}
