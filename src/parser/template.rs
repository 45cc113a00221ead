//! Go template scanner for chart templates.
//!
//! Two entry points:
//! - [`scan_line`] finds the substitution expressions on a single line, which
//!   is all the quoting rules need.
//! - [`parse_template`] walks a whole template and records structural errors
//!   (unclosed actions, unbalanced blocks, undefined functions) without
//!   evaluating anything.

use std::fmt;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A `{{ ... }}` substitution found on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
    /// Action body with trim markers and surrounding whitespace removed.
    pub content: String,
    /// `{{-` was used.
    pub trim_left: bool,
    /// `-}}` was used.
    pub trim_right: bool,
}

impl Substitution {
    /// The pipeline stages of the action, split on `|` outside of string
    /// literals and parentheses.
    pub fn stages(&self) -> Vec<&str> {
        split_pipeline(&self.content)
    }

    /// Name of the function invoked by the last pipeline stage, if the stage
    /// starts with an identifier.
    ///
    /// `{{ .Values.name | default "x" | quote }}` yields `quote`.
    pub fn final_stage(&self) -> Option<&str> {
        let stages = self.stages();
        let last = stages.last()?;
        last.split_whitespace().next().filter(|w| is_identifier(w))
    }

    /// Text of the substitution exactly as it appears on the line.
    pub fn source<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}

/// Find every substitution on `line`, left to right.
///
/// Template comments (`{{/* ... */}}`) are skipped. A trailing action with no
/// closing `}}` ends the scan; [`parse_template`] reports it.
pub fn scan_line(line: &str) -> Vec<Substitution> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = line[pos..].find(OPEN) {
        let start = pos + offset;
        let body_start = start + OPEN.len();
        let Some(body_end) = find_action_end(line, body_start) else {
            break;
        };
        let end = body_end + CLOSE.len();
        let (content, trim_left, trim_right) = strip_trim_markers(&line[body_start..body_end]);

        if !is_comment(content) {
            found.push(Substitution {
                start,
                end,
                content: content.to_string(),
                trim_left,
                trim_right,
            });
        }
        pos = end;
    }

    found
}

/// Locate the `}}` closing the action whose body starts at `from`.
///
/// A comment (`/*` right after `{{` or `{{- `) runs to the first `*/`, which
/// must be followed directly by `}}` or ` -}}`; anything else leaves it
/// unclosed.
fn find_action_end(text: &str, from: usize) -> Option<usize> {
    let body = &text[from..];
    let after_marker = match body.strip_prefix('-') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_whitespace()) => &rest[1..],
        _ => body,
    };
    let Some(comment) = after_marker.strip_prefix("/*") else {
        return find_close(text.as_bytes(), from);
    };

    let comment_end = comment.find("*/")? + 2;
    let rest = &comment[comment_end..];
    let rest = rest.strip_prefix(" -").unwrap_or(rest);
    rest.starts_with(CLOSE).then(|| text.len() - rest.len())
}

/// Locate the `}}` closing an action whose body starts at `from`.
///
/// Braces inside `"..."` and `` `...` `` literals do not close the action.
fn find_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' && q == b'"' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'`' {
                    quote = Some(b);
                } else if b == b'}' && bytes.get(i + 1) == Some(&b'}') {
                    return Some(i);
                }
            }
        }
        i += 1;
    }

    None
}

/// Remove `-` trim markers and surrounding whitespace from an action body.
fn strip_trim_markers(body: &str) -> (&str, bool, bool) {
    let mut inner = body;

    let trim_left = inner.starts_with('-')
        && inner[1..].starts_with(|c: char| c.is_whitespace());
    if trim_left {
        inner = &inner[1..];
    }

    let trim_right = inner.ends_with('-')
        && inner[..inner.len() - 1].ends_with(|c: char| c.is_whitespace());
    if trim_right {
        inner = &inner[..inner.len() - 1];
    }

    (inner.trim(), trim_left, trim_right)
}

fn is_comment(content: &str) -> bool {
    content.starts_with("/*")
}

/// Split an action body into pipeline stages.
fn split_pipeline(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut stages = Vec::new();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    let mut stage_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' && q == b'"' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b'|' if depth == 0 => {
                    stages.push(content[stage_start..i].trim());
                    stage_start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }

    stages.push(content[stage_start..].trim());
    stages
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Control structure type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlStructure {
    If,
    Else,
    Range,
    With,
    Define,
    Block,
    Template,
    End,
    Break,
    Continue,
}

impl ControlStructure {
    /// Parse from action content.
    pub fn parse(content: &str) -> Option<Self> {
        let first_word = content.split_whitespace().next()?;

        match first_word {
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "range" => Some(Self::Range),
            "with" => Some(Self::With),
            "define" => Some(Self::Define),
            "block" => Some(Self::Block),
            "template" => Some(Self::Template),
            "end" => Some(Self::End),
            "break" => Some(Self::Break),
            "continue" => Some(Self::Continue),
            _ => None,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Else => "else",
            Self::Range => "range",
            Self::With => "with",
            Self::Define => "define",
            Self::Block => "block",
            Self::Template => "template",
            Self::End => "end",
            Self::Break => "break",
            Self::Continue => "continue",
        }
    }
}

impl fmt::Display for ControlStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What went wrong in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `{{` with no matching `}}`.
    UnclosedAction,
    /// Block opened by `if`/`range`/`with`/`define`/`block` never ended.
    UnclosedBlock(ControlStructure),
    /// `end` or `else` with no open block.
    UnexpectedKeyword(ControlStructure),
    /// A pipeline stage calls a function the engine does not provide.
    UndefinedFunction(String),
}

/// Structural error found while scanning a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
}

impl TemplateParseError {
    /// Human-readable description.
    pub fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::UnclosedAction => "unclosed action (missing }})".to_string(),
            ParseErrorKind::UnclosedBlock(structure) => {
                format!("unclosed {{{{ {} }}}} block (missing {{{{ end }}}})", structure)
            }
            ParseErrorKind::UnexpectedKeyword(structure) => {
                format!("unexpected {{{{ {} }}}} with no open block", structure)
            }
            ParseErrorKind::UndefinedFunction(name) => {
                format!("function \"{}\" not defined", name)
            }
        }
    }
}

impl fmt::Display for TemplateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message())
    }
}

/// Lines covered by a template comment, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSpan {
    pub start_line: u32,
    pub end_line: u32,
}

/// Result of scanning a whole template.
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    /// The template path, as given to [`parse_template`].
    pub path: String,
    /// Template comments, in source order.
    pub comments: Vec<CommentSpan>,
    /// Structural errors, in source order.
    pub errors: Vec<TemplateParseError>,
}

impl ParsedTemplate {
    /// Whether `line` lies inside a multi-line comment, past the line that
    /// opens it. The opening line may still hold code before the `{{/*`.
    pub fn in_comment(&self, line: u32) -> bool {
        self.comments
            .iter()
            .any(|c| c.start_line < line && line <= c.end_line)
    }
}

/// Scan a whole template for structural errors.
///
/// Actions may span several lines; reported line numbers are those of the
/// opening `{{`.
pub fn parse_template(content: &str, path: &str) -> ParsedTemplate {
    let bytes = content.as_bytes();
    let mut comments = Vec::new();
    let mut errors = Vec::new();
    let mut block_stack: Vec<(ControlStructure, u32)> = Vec::new();

    let mut line_num: u32 = 1;
    let mut pos = 0;

    while let Some(offset) = content[pos..].find(OPEN) {
        let start = pos + offset;
        line_num = line_num.saturating_add(count_newlines(&bytes[pos..start]));
        let body_start = start + OPEN.len();

        let Some(body_end) = find_action_end(content, body_start) else {
            errors.push(TemplateParseError {
                kind: ParseErrorKind::UnclosedAction,
                line: line_num,
            });
            break;
        };
        let end_line = line_num.saturating_add(count_newlines(&bytes[start..body_end]));

        let (body, _, _) = strip_trim_markers(&content[body_start..body_end]);
        if is_comment(body) {
            comments.push(CommentSpan {
                start_line: line_num,
                end_line,
            });
        } else {
            analyze_action(body, line_num, &mut block_stack, &mut errors);
        }

        line_num = end_line;
        pos = body_end + CLOSE.len();
    }

    for (structure, line) in block_stack {
        errors.push(TemplateParseError {
            kind: ParseErrorKind::UnclosedBlock(structure),
            line,
        });
    }

    ParsedTemplate {
        path: path.to_string(),
        comments,
        errors,
    }
}

fn count_newlines(bytes: &[u8]) -> u32 {
    let count = bytes.iter().filter(|&&b| b == b'\n').count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Track block nesting and check function names used by one action.
fn analyze_action(
    content: &str,
    line: u32,
    block_stack: &mut Vec<(ControlStructure, u32)>,
    errors: &mut Vec<TemplateParseError>,
) {
    let mut pipeline = content;

    if let Some(structure) = ControlStructure::parse(content) {
        pipeline = content[structure.keyword().len()..].trim_start();
        match structure {
            ControlStructure::End => {
                if block_stack.pop().is_none() {
                    errors.push(TemplateParseError {
                        kind: ParseErrorKind::UnexpectedKeyword(structure),
                        line,
                    });
                }
                return;
            }
            ControlStructure::Else => {
                if block_stack.is_empty() {
                    errors.push(TemplateParseError {
                        kind: ParseErrorKind::UnexpectedKeyword(structure),
                        line,
                    });
                    return;
                }
                // `else if` / `else with` carry a condition
                pipeline = pipeline
                    .strip_prefix("if")
                    .or_else(|| pipeline.strip_prefix("with"))
                    .unwrap_or("");
            }
            ControlStructure::Define | ControlStructure::Block => {
                block_stack.push((structure, line));
                return;
            }
            ControlStructure::Template
            | ControlStructure::Break
            | ControlStructure::Continue => return,
            _ => block_stack.push((structure, line)),
        }
    }

    let mut reported: Vec<&str> = Vec::new();
    for stage in split_pipeline(strip_declaration(pipeline)) {
        let Some(head) = stage.split_whitespace().next() else {
            continue;
        };
        if is_identifier(head)
            && !is_literal_keyword(head)
            && !TEMPLATE_FUNCTIONS.contains(&head)
            && !reported.contains(&head)
        {
            reported.push(head);
            errors.push(TemplateParseError {
                kind: ParseErrorKind::UndefinedFunction(head.to_string()),
                line,
            });
        }
    }
}

/// Drop a leading `$var :=` / `$a, $b :=` / `$var =` from a pipeline.
fn strip_declaration(pipeline: &str) -> &str {
    let pipeline = pipeline.trim();
    if !pipeline.starts_with('$') {
        return pipeline;
    }
    if let Some(idx) = pipeline.find(":=") {
        return pipeline[idx + 2..].trim_start();
    }
    if let Some(idx) = pipeline.find(" = ") {
        return pipeline[idx + 3..].trim_start();
    }
    pipeline
}

fn is_literal_keyword(word: &str) -> bool {
    matches!(word, "nil" | "true" | "false")
}

/// Functions available to chart templates: text/template builtins, the
/// sprig library and the chart-specific additions.
const TEMPLATE_FUNCTIONS: &[&str] = &[
    // text/template
    "and", "call", "html", "index", "slice", "js", "len", "not", "or", "print", "printf",
    "println", "urlquery", "eq", "ne", "lt", "le", "gt", "ge",
    // chart engine
    "include", "tpl", "required", "lookup", "toYaml", "toYamlPretty", "fromYaml",
    "fromYamlArray", "toJson", "fromJson", "fromJsonArray", "toToml", "fromToml",
    // strings
    "trim", "trimAll", "trimall", "trimPrefix", "trimSuffix", "upper", "lower", "title",
    "untitle", "repeat", "substr", "nospace", "trunc", "abbrev", "abbrevboth", "initials",
    "randAlphaNum", "randAlpha", "randNumeric", "randAscii", "randInt", "wrap", "wrapWith",
    "contains", "hasPrefix", "hasSuffix", "quote", "squote", "cat", "indent", "nindent",
    "replace", "plural", "snakecase", "camelcase", "kebabcase", "swapcase", "shuffle",
    "regexMatch", "mustRegexMatch", "regexFindAll", "mustRegexFindAll", "regexFind",
    "mustRegexFind", "regexReplaceAll", "mustRegexReplaceAll", "regexReplaceAllLiteral",
    "mustRegexReplaceAllLiteral", "regexSplit", "mustRegexSplit", "regexQuoteMeta",
    "toString", "toStrings", "toDecimal", "splitList", "split", "splitn", "join",
    "sortAlpha",
    // numbers
    "atoi", "int", "int64", "float64", "add", "add1", "sub", "div", "mod", "mul", "max",
    "min", "biggest", "floor", "ceil", "round", "addf", "add1f", "subf", "divf", "mulf",
    "maxf", "minf", "until", "untilStep", "seq",
    // dates
    "now", "date", "dateInZone", "date_in_zone", "duration", "durationRound", "unixEpoch",
    "dateModify", "date_modify", "mustDateModify", "htmlDate", "htmlDateInZone", "toDate",
    "mustToDate", "ago",
    // defaults and flow
    "default", "empty", "coalesce", "all", "any", "ternary", "fail", "hello",
    // encoding
    "mustFromJson", "mustToJson", "toPrettyJson", "mustToPrettyJson", "toRawJson",
    "mustToRawJson", "b64enc", "b64dec", "b32enc", "b32dec",
    // reflection
    "deepCopy", "mustDeepCopy", "typeOf", "typeIs", "typeIsLike", "kindOf", "kindIs",
    "deepEqual",
    // lists
    "list", "tuple", "first", "mustFirst", "rest", "mustRest", "last", "mustLast",
    "initial", "mustInitial", "append", "mustAppend", "push", "mustPush", "prepend",
    "mustPrepend", "concat", "reverse", "mustReverse", "uniq", "mustUniq", "without",
    "mustWithout", "has", "mustHas", "compact", "mustCompact", "mustSlice", "chunk",
    "mustChunk",
    // dicts
    "dict", "get", "set", "unset", "hasKey", "pluck", "dig", "merge", "mustMerge",
    "mergeOverwrite", "mustMergeOverwrite", "keys", "pick", "omit", "values",
    // crypto
    "sha1sum", "sha256sum", "sha512sum", "adler32sum", "bcrypt", "randBytes", "htpasswd",
    "derivePassword", "genPrivateKey", "buildCustomCert", "genCA", "genCAWithKey",
    "genSelfSignedCert", "genSelfSignedCertWithKey", "genSignedCert", "genSignedCertWithKey",
    "encryptAES", "decryptAES", "uuidv4",
    // versions, paths, network, env
    "semver", "semverCompare", "base", "dir", "clean", "ext", "isAbs", "osBase", "osDir",
    "osClean", "osExt", "osIsAbs", "getHostByName", "urlParse", "urlJoin", "env",
    "expandenv",
];
