//! Declarative command-line argument parsing.
//!
//! Callers describe their options as a list of [`Opt`] descriptors, hand the
//! list to a [`Parser`] together with the raw argument vector, and read the
//! results back with typed accessors:
//! - `Opt::new::<T>("name")` binds the option kind to `T` at compile time
//! - short options cluster (`-abc`), long options take `--name=value` or a
//!   separate token, and boolean/tri-state options negate as `--no-name`
//! - `parser.get::<T>("name")` for typed retrieval after parsing
//! - the matching/coercion core returns `Result`; [`Parser::parse_or_exit`]
//!   preserves the classic print-and-exit behavior for drop-in use
//!
//! Note that a `Parser` is meant for a single parse of a single argument
//! vector: values stored by an earlier parse are not reset to a baseline, so
//! re-running `parse` on the same instance is not idempotent.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

// ============================================================================
// Result and Error types
// ============================================================================

pub type Result<T> = std::result::Result<T, Error>;

/// Parse failures.
///
/// User-input errors carry the offending option's spelling (`-c` or
/// `--name`); `UnknownOption` carries the whole offending token.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("option `{0}` requires a value")]
    MissingValue(String),

    #[error("option `{0}` expects an integer value")]
    BadInteger(String),

    #[error("option `{0}` expects a floating point value")]
    BadFloat(String),

    #[error("option `{0}` requires a single character")]
    BadChar(String),

    #[error("option `{0}` numerical result out of range")]
    OutOfRange(String),

    #[error("invalid option descriptor: {0}")]
    BadDescriptor(String),

    #[error("option not found: {0}")]
    NotFound(String),

    #[error("type mismatch for option `{0}`")]
    TypeMismatch(String),
}

// ============================================================================
// Ternary — three-valued flag type
// ============================================================================

/// A three-valued logical type for flags whose absence is meaningfully
/// different from an explicit negative: `--flag` yields `Yes`, `--no-flag`
/// yields `No`, and an unmentioned flag stays `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ternary {
    #[default]
    Unset,
    Yes,
    No,
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ternary::Unset => "none",
            Ternary::Yes => "yes",
            Ternary::No => "no",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Kind — option kind tags
// ============================================================================

/// The kind tag of an option descriptor.
///
/// `Group` marks a non-selectable heading line in the help output; every
/// other kind corresponds to one supported scalar target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Group,
    Bool,
    Ternary,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Str,
}

// ============================================================================
// Value — typed value storage
// ============================================================================

/// A parsed (or default) option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Ternary(Ternary),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Str(String),
}

impl Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Ternary(_) => Kind::Ternary,
            Value::Char(_) => Kind::Char,
            Value::I8(_) => Kind::I8,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::Isize(_) => Kind::Isize,
            Value::U8(_) => Kind::U8,
            Value::U16(_) => Kind::U16,
            Value::U32(_) => Kind::U32,
            Value::U64(_) => Kind::U64,
            Value::Usize(_) => Kind::Usize,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Str(_) => Kind::Str,
        }
    }
}

// ============================================================================
// Scalar — statically checked type/kind binding
// ============================================================================

/// Trait tying each supported target type to its [`Kind`] tag.
///
/// Descriptor constructors take the target type as a generic parameter, so a
/// descriptor's declared kind and its retrieval type cannot drift apart.
pub trait Scalar: Sized {
    const KIND: Kind;
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! scalar {
    ($t:ty, $variant:ident) => {
        impl Scalar for $t {
            const KIND: Kind = Kind::$variant;
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
        impl From<$t> for Value {
            fn from(v: $t) -> Value {
                Value::$variant(v)
            }
        }
    };
}

scalar!(bool, Bool);
scalar!(Ternary, Ternary);
scalar!(char, Char);
scalar!(i8, I8);
scalar!(i16, I16);
scalar!(i32, I32);
scalar!(i64, I64);
scalar!(isize, Isize);
scalar!(u8, U8);
scalar!(u16, U16);
scalar!(u32, U32);
scalar!(u64, U64);
scalar!(usize, Usize);
scalar!(f32, F32);
scalar!(f64, F64);

impl Scalar for String {
    const KIND: Kind = Kind::Str;
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_string())
    }
}

// ============================================================================
// Flow — callback protocol
// ============================================================================

/// What the parser should do after an option callback returns.
///
/// `Stop` abandons the unprocessed remainder of the current short-option
/// cluster; it has no effect on a long-option match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub type OptionCallback = Arc<dyn Fn(&Parser, &Opt) -> Result<Flow> + Send + Sync + 'static>;

// ============================================================================
// Opt — option descriptor
// ============================================================================

/// One option descriptor: kind, spellings, help text, optional default,
/// optional callback, and flags.
#[derive(Clone)]
pub struct Opt {
    kind: Kind,
    short_name: Option<char>,
    long_name: Option<String>,
    description: Option<String>,
    default: Option<Value>,
    callback: Option<OptionCallback>,
    no_negation: bool,
}

impl Opt {
    fn bare(kind: Kind) -> Self {
        Opt {
            kind,
            short_name: None,
            long_name: None,
            description: None,
            default: None,
            callback: None,
            no_negation: false,
        }
    }

    /// Create a group header: a non-selectable heading line used purely to
    /// section the help output.
    pub fn group(heading: &str) -> Self {
        let mut opt = Opt::bare(Kind::Group);
        opt.description = Some(heading.to_string());
        opt
    }

    /// Create a descriptor keyed by long name only; the kind is bound to `T`
    /// at compile time.
    pub fn new<T: Scalar>(long_name: &str) -> Self {
        let mut opt = Opt::bare(T::KIND);
        opt.long_name = Some(long_name.to_string());
        opt
    }

    /// Create a descriptor keyed by short name, with an optional long name.
    pub fn with_short<T: Scalar>(short_name: char, long_name: Option<&str>) -> Self {
        let mut opt = Opt::bare(T::KIND);
        opt.short_name = Some(short_name);
        opt.long_name = long_name.map(|s| s.to_string());
        opt
    }

    /// The pre-built `-h`/`--help` option: negation disabled, prints usage
    /// and exits the process with status 0 when matched.
    pub fn help() -> Self {
        Opt::with_short::<bool>('h', Some("help"))
            .description("show this help message and exit")
            .no_negation()
            .callback(|parser: &Parser, _opt: &Opt| {
                parser.usage();
                std::process::exit(0);
            })
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Set the value reported when the option is absent from the command
    /// line. The value's kind must match the descriptor's declared kind;
    /// a mismatch is rejected when parsing starts.
    pub fn default_val(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Install a callback invoked after each successful match of this
    /// option, once its value has been stored. The callback borrows the
    /// parser for the duration of the call only.
    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&Parser, &Opt) -> Result<Flow> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(f));
        self
    }

    /// Disable `--no-<name>` matching for this descriptor.
    pub fn no_negation(mut self) -> Self {
        self.no_negation = true;
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// The key under which this option's value is stored: the long name,
    /// or the short name when no long form exists.
    fn storage_key(&self) -> String {
        match (&self.long_name, self.short_name) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }
}

// ============================================================================
// Numeral scanning (strtol-family semantics)
// ============================================================================

struct IntScan {
    value: i128,
    out_of_range: bool,
    malformed: bool,
}

struct UintScan {
    value: u128,
    out_of_range: bool,
    malformed: bool,
}

/// Scan a numeral prefix: optional sign, then hex (`0x`), octal (leading
/// `0`) or decimal digits. Returns the sign, the magnitude (saturating flag
/// set on accumulator overflow) and the byte offset one past the last digit,
/// or `None` if no digit was consumed.
fn scan_integer(s: &str) -> Option<(bool, u128, bool, usize)> {
    let b = s.as_bytes();
    let mut i = 0;
    let mut negative = false;
    if let Some(&c) = b.first() {
        if c == b'+' || c == b'-' {
            negative = c == b'-';
            i = 1;
        }
    }
    let mut radix: u128 = 10;
    if b.get(i) == Some(&b'0') {
        let hex = matches!(b.get(i + 1), Some(&b'x') | Some(&b'X'))
            && b.get(i + 2).is_some_and(|c| c.is_ascii_hexdigit());
        if hex {
            radix = 16;
            i += 2;
        } else {
            radix = 8;
        }
    }
    let mut magnitude: u128 = 0;
    let mut overflow = false;
    let mut any = false;
    while let Some(&c) = b.get(i) {
        let digit = match (c as char).to_digit(radix as u32) {
            Some(d) => u128::from(d),
            None => break,
        };
        any = true;
        match magnitude.checked_mul(radix).and_then(|m| m.checked_add(digit)) {
            Some(m) => magnitude = m,
            None => overflow = true,
        }
        i += 1;
    }
    if any {
        Some((negative, magnitude, overflow, i))
    } else {
        None
    }
}

/// Parse a signed numeral and range-check it against `[min, max]`. An
/// out-of-range value clamps to the sign-determined extreme.
fn scan_signed(s: &str, min: i128, max: i128) -> IntScan {
    let (negative, magnitude, overflow, end) = match scan_integer(s) {
        Some(scan) => scan,
        None => {
            return IntScan {
                value: 0,
                out_of_range: false,
                malformed: true,
            }
        }
    };
    let malformed = end != s.len();
    let wide = if magnitude > i128::MAX as u128 {
        None
    } else if negative {
        Some(-(magnitude as i128))
    } else {
        Some(magnitude as i128)
    };
    match wide {
        Some(value) if !overflow && value >= min && value <= max => IntScan {
            value,
            out_of_range: false,
            malformed,
        },
        _ => IntScan {
            value: if negative { min } else { max },
            out_of_range: true,
            malformed,
        },
    }
}

/// Parse an unsigned numeral and range-check it against `[0, max]`. An
/// out-of-range or negative value clamps to `max`.
fn scan_unsigned(s: &str, max: u128) -> UintScan {
    let (negative, magnitude, overflow, end) = match scan_integer(s) {
        Some(scan) => scan,
        None => {
            return UintScan {
                value: 0,
                out_of_range: false,
                malformed: true,
            }
        }
    };
    let malformed = end != s.len();
    if overflow || magnitude > max || (negative && magnitude > 0) {
        UintScan {
            value: max,
            out_of_range: true,
            malformed,
        }
    } else {
        UintScan {
            value: magnitude,
            out_of_range: false,
            malformed,
        }
    }
}

// Clamped extremes are stored before the error returns, so a failed parse
// still leaves the destination at the representable bound.
macro_rules! signed_arm {
    ($self:ident, $key:ident, $spelling:ident, $variant:ident, $t:ty) => {{
        let raw = $self.take_value(&$spelling)?;
        let scan = scan_signed(&raw, <$t>::MIN as i128, <$t>::MAX as i128);
        $self
            .values
            .insert($key.clone(), Value::$variant(scan.value as $t));
        if scan.out_of_range {
            return Err(Error::OutOfRange($spelling));
        }
        if scan.malformed {
            return Err(Error::BadInteger($spelling));
        }
    }};
}

macro_rules! unsigned_arm {
    ($self:ident, $key:ident, $spelling:ident, $variant:ident, $t:ty) => {{
        let raw = $self.take_value(&$spelling)?;
        let scan = scan_unsigned(&raw, <$t>::MAX as u128);
        $self
            .values
            .insert($key.clone(), Value::$variant(scan.value as $t));
        if scan.out_of_range {
            return Err(Error::OutOfRange($spelling));
        }
        if scan.malformed {
            return Err(Error::BadInteger($spelling));
        }
    }};
}

// ============================================================================
// Parser
// ============================================================================

/// The parser: descriptor list, usage metadata, and per-parse state.
///
/// Construct with [`Parser::new`], configure with the chained builder
/// methods, then call [`Parser::parse`] (structured errors) or
/// [`Parser::parse_or_exit`] (print-and-exit) exactly once.
pub struct Parser {
    options: Vec<Opt>,
    usages: Vec<String>,
    description: Option<String>,
    epilogue: Option<String>,
    stop_at_non_option: bool,
    values: HashMap<String, Value>,
    present: HashSet<String>,
    // Per-parse state: the remaining raw arguments, the read cursor, the
    // compacted output, and the unconsumed suffix of a short cluster (or
    // inline long-option value).
    args: Vec<String>,
    next: usize,
    out: Vec<String>,
    optvalue: Option<String>,
}

impl Parser {
    pub fn new(options: Vec<Opt>) -> Self {
        Parser {
            options,
            usages: Vec::new(),
            description: None,
            epilogue: None,
            stop_at_non_option: false,
            values: HashMap::new(),
            present: HashSet::new(),
            args: Vec::new(),
            next: 0,
            out: Vec::new(),
            optvalue: None,
        }
    }

    /// Set the usage lines printed at the top of the help output.
    pub fn usages(mut self, lines: &[&str]) -> Self {
        self.usages = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn epilogue(mut self, text: &str) -> Self {
        self.epilogue = Some(text.to_string());
        self
    }

    /// Terminate parsing at the first token that is not an option; it and
    /// everything after it become trailing arguments.
    pub fn stop_at_non_option(mut self) -> Self {
        self.stop_at_non_option = true;
        self
    }

    /// Walk the argument vector, filling in option values and compacting
    /// the unconsumed tokens.
    ///
    /// `argv` is the full process argument vector; its first element is the
    /// program name, which is never interpreted as an option. On success the
    /// returned vector holds the program name followed by the trailing
    /// arguments in their original order.
    pub fn parse(&mut self, argv: Vec<String>) -> Result<Vec<String>> {
        self.validate()?;
        for opt in &self.options {
            if let Some(default) = &opt.default {
                self.values.insert(opt.storage_key(), default.clone());
            }
        }

        self.args = argv;
        self.out = Vec::with_capacity(self.args.len());
        self.next = 0;
        self.optvalue = None;
        if let Some(program) = self.args.first() {
            self.out.push(program.clone());
            self.next = 1;
        }

        while self.next < self.args.len() {
            let arg = self.args[self.next].clone();

            // Plain argument: no dash prefix, or a bare "-".
            if !arg.starts_with('-') || arg == "-" {
                if self.stop_at_non_option {
                    let rest = self.args[self.next..].to_vec();
                    self.out.extend(rest);
                    break;
                }
                self.out.push(arg);
                self.next += 1;
                continue;
            }

            // "--" terminator: everything after it is trailing, verbatim.
            if arg == "--" {
                self.next += 1;
                let rest = self.args[self.next..].to_vec();
                self.out.extend(rest);
                break;
            }

            self.next += 1;
            if arg.as_bytes()[1] != b'-' {
                // Short cluster: each match may leave a shorter suffix for
                // the next short option in the same token.
                self.optvalue = Some(arg[1..].to_string());
                while self.optvalue.is_some() {
                    if self.short_opt(&arg)? == Flow::Stop {
                        self.optvalue = None;
                    }
                }
            } else {
                self.long_opt(&arg)?;
            }
        }

        self.args.clear();
        self.next = 0;
        Ok(std::mem::take(&mut self.out))
    }

    /// Like [`Parser::parse`], but preserves the classic fatal behavior:
    /// diagnostics go to stderr, unknown options additionally print the
    /// usage text to stdout, and the process exits with status 1.
    pub fn parse_or_exit(&mut self, argv: Vec<String>) -> Vec<String> {
        match self.parse(argv) {
            Ok(rest) => rest,
            Err(err) => {
                eprintln!("error: {}", err);
                if matches!(err, Error::UnknownOption(_)) {
                    self.usage();
                }
                std::process::exit(1);
            }
        }
    }

    /// Get a typed value by option name (long name, or short name for
    /// options without a long form).
    pub fn get<T: Scalar>(&self, name: &str) -> Result<T> {
        match self.values.get(name) {
            Some(value) => {
                T::from_value(value).ok_or_else(|| Error::TypeMismatch(name.to_string()))
            }
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    /// Check whether an option was explicitly mentioned on the command line
    /// (as opposed to holding its default).
    pub fn is_present(&self, name: &str) -> bool {
        self.present.contains(name)
    }

    // ------------------------------------------------------------------
    // Matching and coercion
    // ------------------------------------------------------------------

    /// Descriptor sanity checks, run once before scanning begins. These
    /// guard against construction bugs, not user input: the kind set itself
    /// is closed by the `Kind` enum, so only the checks the type system
    /// cannot express remain.
    fn validate(&self) -> Result<()> {
        for opt in &self.options {
            if opt.kind == Kind::Group {
                continue;
            }
            if opt.short_name.is_none() && opt.long_name.is_none() {
                return Err(Error::BadDescriptor(
                    "option declares neither a short nor a long name".to_string(),
                ));
            }
            if let Some(default) = &opt.default {
                if default.kind() != opt.kind {
                    return Err(Error::BadDescriptor(format!(
                        "default value does not match the declared kind of `{}`",
                        opt.storage_key()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Match the first character of the current cluster suffix against the
    /// descriptors in declaration order.
    fn short_opt(&mut self, token: &str) -> Result<Flow> {
        let cluster = match self.optvalue.take() {
            Some(cluster) => cluster,
            None => return Ok(Flow::Continue),
        };
        let c = match cluster.chars().next() {
            Some(c) => c,
            None => return Ok(Flow::Continue),
        };
        let idx = match self
            .options
            .iter()
            .position(|o| o.short_name == Some(c))
        {
            Some(idx) => idx,
            None => return Err(Error::UnknownOption(token.to_string())),
        };
        // The rest of the cluster becomes either the inline value (for
        // value-taking kinds) or the next short options.
        let rest = &cluster[c.len_utf8()..];
        if !rest.is_empty() {
            self.optvalue = Some(rest.to_string());
        }
        self.apply(idx, false, format!("-{}", c))
    }

    /// Match a `--`-prefixed token against the descriptors in declaration
    /// order, including the `no-` negated form for bool/ternary kinds.
    fn long_opt(&mut self, token: &str) -> Result<Flow> {
        let body = &token[2..];
        let mut matched: Option<(usize, bool, Option<String>)> = None;
        for (idx, opt) in self.options.iter().enumerate() {
            let long = match &opt.long_name {
                Some(long) => long,
                None => continue,
            };
            let (rest, negated) = match body.strip_prefix(long.as_str()) {
                Some(rest) => (rest, false),
                None => {
                    if opt.no_negation || !matches!(opt.kind, Kind::Bool | Kind::Ternary) {
                        continue;
                    }
                    match body
                        .strip_prefix("no-")
                        .and_then(|b| b.strip_prefix(long.as_str()))
                    {
                        Some(rest) => (rest, true),
                        None => continue,
                    }
                }
            };
            // The long name must be followed by end-of-token or '='.
            let inline = if rest.is_empty() {
                None
            } else if let Some(v) = rest.strip_prefix('=') {
                Some(v.to_string())
            } else {
                continue;
            };
            matched = Some((idx, negated, inline));
            break;
        }
        match matched {
            Some((idx, negated, inline)) => {
                self.optvalue = inline;
                let spelling = format!(
                    "--{}",
                    self.options[idx].long_name.as_deref().unwrap_or_default()
                );
                let flow = self.apply(idx, negated, spelling)?;
                // An inline value on a non-consuming kind is discarded.
                self.optvalue = None;
                Ok(flow)
            }
            None => Err(Error::UnknownOption(token.to_string())),
        }
    }

    /// Take the raw value for a value-consuming option: the inline value if
    /// one is pending, otherwise the next whole argument token.
    fn take_value(&mut self, spelling: &str) -> Result<String> {
        if let Some(value) = self.optvalue.take() {
            return Ok(value);
        }
        if self.next < self.args.len() {
            let value = self.args[self.next].clone();
            self.next += 1;
            return Ok(value);
        }
        Err(Error::MissingValue(spelling.to_string()))
    }

    /// Coerce and store the value for a matched descriptor, then run its
    /// callback if it has one.
    fn apply(&mut self, idx: usize, negated: bool, spelling: String) -> Result<Flow> {
        let opt = self.options[idx].clone();
        let key = opt.storage_key();

        match opt.kind {
            // Group headers carry no names and never match.
            Kind::Group => {}
            // Non-consuming kinds leave optvalue alone: during cluster
            // processing it holds the remaining short options, and an inline
            // long-option value is discarded by the long matcher itself.
            Kind::Bool => {
                self.values.insert(key.clone(), Value::Bool(!negated));
            }
            Kind::Ternary => {
                let t = if negated { Ternary::No } else { Ternary::Yes };
                self.values.insert(key.clone(), Value::Ternary(t));
            }
            Kind::Str => {
                let raw = self.take_value(&spelling)?;
                self.values.insert(key.clone(), Value::Str(raw));
            }
            Kind::Char => {
                let raw = self.take_value(&spelling)?;
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        self.values.insert(key.clone(), Value::Char(c));
                    }
                    _ => return Err(Error::BadChar(spelling)),
                }
            }
            Kind::I8 => signed_arm!(self, key, spelling, I8, i8),
            Kind::I16 => signed_arm!(self, key, spelling, I16, i16),
            Kind::I32 => signed_arm!(self, key, spelling, I32, i32),
            Kind::I64 => signed_arm!(self, key, spelling, I64, i64),
            Kind::Isize => signed_arm!(self, key, spelling, Isize, isize),
            Kind::U8 => unsigned_arm!(self, key, spelling, U8, u8),
            Kind::U16 => unsigned_arm!(self, key, spelling, U16, u16),
            Kind::U32 => unsigned_arm!(self, key, spelling, U32, u32),
            Kind::U64 => unsigned_arm!(self, key, spelling, U64, u64),
            Kind::Usize => unsigned_arm!(self, key, spelling, Usize, usize),
            Kind::F32 => {
                let raw = self.take_value(&spelling)?;
                let v: f32 = raw.parse().map_err(|_| Error::BadFloat(spelling))?;
                self.values.insert(key.clone(), Value::F32(v));
            }
            Kind::F64 => {
                let raw = self.take_value(&spelling)?;
                let v: f64 = raw.parse().map_err(|_| Error::BadFloat(spelling))?;
                self.values.insert(key.clone(), Value::F64(v));
            }
        }

        self.present.insert(key);

        if let Some(cb) = &opt.callback {
            return cb(&*self, &opt);
        }
        Ok(Flow::Continue)
    }

    // ------------------------------------------------------------------
    // Usage rendering
    // ------------------------------------------------------------------

    /// Print the usage text to stdout.
    pub fn usage(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let _ = self.write_usage(&mut out);
    }

    /// Render the usage/help block: usage lines, description, then one line
    /// per descriptor with the help text aligned to a common column.
    pub fn write_usage<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(first) = self.usages.first() {
            writeln!(out, "Usage: {}", first)?;
            for line in &self.usages[1..] {
                writeln!(out, "   or: {}", line)?;
            }
        } else {
            writeln!(out, "Usage:")?;
        }

        if let Some(description) = &self.description {
            writeln!(out, "{}", description)?;
        }
        writeln!(out)?;

        // Column width: the widest rendered option, rounded up to a multiple
        // of four, plus the four-space line prefix.
        let mut width = 0usize;
        for opt in &self.options {
            if opt.kind == Kind::Group {
                continue;
            }
            let mut len = 0usize;
            if opt.short_name.is_some() {
                len += 2;
            }
            if opt.short_name.is_some() && opt.long_name.is_some() {
                len += 2;
            }
            if let Some(long) = &opt.long_name {
                len += long.len() + 2;
            }
            if let Some(placeholder) = value_placeholder(opt.kind) {
                len += placeholder.len();
            }
            len = (len + 3) & !3;
            width = width.max(len);
        }
        width += 4;

        for opt in &self.options {
            let help = opt.description.as_deref().unwrap_or_default();
            if opt.kind == Kind::Group {
                writeln!(out)?;
                writeln!(out, "{}", help)?;
                continue;
            }
            let mut left = String::from("    ");
            if let Some(short) = opt.short_name {
                left.push('-');
                left.push(short);
            }
            if opt.short_name.is_some() && opt.long_name.is_some() {
                left.push_str(", ");
            }
            if let Some(long) = &opt.long_name {
                left.push_str("--");
                left.push_str(long);
            }
            if let Some(placeholder) = value_placeholder(opt.kind) {
                left.push_str(placeholder);
            }
            let pos = left.len();
            if pos <= width {
                writeln!(out, "{}{:pad$}{}", left, "", help, pad = width - pos + 2)?;
            } else {
                writeln!(out, "{}", left)?;
                writeln!(out, "{:pad$}{}", "", help, pad = width + 2)?;
            }
        }

        if let Some(epilogue) = &self.epilogue {
            writeln!(out, "{}", epilogue)?;
        }
        Ok(())
    }
}

/// The value placeholder shown after an option's spelling in the help
/// output, or `None` for kinds that take no value.
fn value_placeholder(kind: Kind) -> Option<&'static str> {
    match kind {
        Kind::Group | Kind::Bool | Kind::Ternary => None,
        Kind::Char => Some("=<char>"),
        Kind::Str => Some("=<str>"),
        Kind::F32 | Kind::F64 => Some("=<flt>"),
        _ => Some("=<int>"),
    }
}
