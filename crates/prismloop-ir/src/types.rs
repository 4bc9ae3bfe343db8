use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the synthesized program-counter variable.
pub const PROGRAM_COUNTER: &str = "pc";
/// Name of the synthesized loop-counter variable.
pub const LOOP_COUNTER: &str = "k";
/// Name of the external constant bounding the loop counter.
pub const LOOP_BOUND: &str = "N";

/// Names the assembler reserves for itself.
pub const RESERVED_NAMES: [&str; 3] = [PROGRAM_COUNTER, LOOP_COUNTER, LOOP_BOUND];

const EMPTY_ENUMERATION: (i64, i64) = (0, -1);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeclError {
    #[error("Variable name must not be empty")]
    EmptyName,

    #[error("Variable '{name}' has an empty range: [{low}..{high}]")]
    EmptyRange { name: String, low: i64, high: i64 },

    #[error("Variable '{name}' initial value {init} lies outside [{low}..{high}]")]
    InitOutOfRange {
        name: String,
        init: i64,
        low: i64,
        high: Bound,
    },

    #[error("Variable '{name}' enumeration range [{enum_low}..{enum_high}] is not within [{low}..{high}]")]
    EnumRangeOutOfBounds {
        name: String,
        enum_low: i64,
        enum_high: i64,
        low: i64,
        high: Bound,
    },

    #[error("Transition guarded by '{guard}' has no outcomes")]
    EmptyOutcomes { guard: String },

    #[error("Transition guarded by '{guard}' claims stamp pc={pc} but does not carry it")]
    InconsistentStamp { guard: String, pc: ProgramCounter },
}

// ── Bounds ───────────────────────────────────────────────────────────

/// Upper bound of a variable: a literal, or a constant left for the
/// model checker to bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Int(i64),
    Const(String),
}

impl Bound {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Bound::Int(v) => Some(*v),
            Bound::Const(_) => None,
        }
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Bound::Int(value)
    }
}

impl From<&str> for Bound {
    fn from(name: &str) -> Self {
        Bound::Const(name.to_string())
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Int(v) => write!(f, "{v}"),
            Bound::Const(name) => f.write_str(name),
        }
    }
}

// ── Program counter ──────────────────────────────────────────────────

/// A value of the synthesized `pc` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramCounter(pub u32);

impl ProgramCounter {
    pub fn value(self) -> u32 {
        self.0
    }

    /// The slot control falls through to after this one.
    pub fn next(self) -> Self {
        ProgramCounter(self.0 + 1)
    }
}

impl fmt::Display for ProgramCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Bounded variables ────────────────────────────────────────────────

/// A bounded integer state variable: `name : [low..high] init init;`.
///
/// The enumeration range restricts which values component expansion
/// branches on; it defaults to the declared range. Values are immutable
/// once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VariableDecl", into = "VariableDecl")]
pub struct BoundedVariable {
    name: String,
    low: i64,
    high: Bound,
    init: i64,
    description: Option<String>,
    enum_low: i64,
    enum_high: i64,
}

impl BoundedVariable {
    pub fn new(name: impl Into<String>, low: i64, high: i64, init: i64) -> Result<Self, DeclError> {
        Self::build(name.into(), low, Bound::Int(high), init)
    }

    /// A variable whose upper bound is an external constant. It cannot be
    /// enumerated until given an explicit enumeration range.
    pub fn symbolic(
        name: impl Into<String>,
        low: i64,
        bound: impl Into<String>,
        init: i64,
    ) -> Result<Self, DeclError> {
        Self::build(name.into(), low, Bound::Const(bound.into()), init)
    }

    fn build(name: String, low: i64, high: Bound, init: i64) -> Result<Self, DeclError> {
        if name.is_empty() {
            return Err(DeclError::EmptyName);
        }
        let (enum_low, enum_high) = match &high {
            Bound::Int(h) => {
                if low > *h {
                    return Err(DeclError::EmptyRange { name, low, high: *h });
                }
                if init < low || init > *h {
                    return Err(DeclError::InitOutOfRange { name, init, low, high });
                }
                (low, *h)
            }
            Bound::Const(_) => {
                if init < low {
                    return Err(DeclError::InitOutOfRange { name, init, low, high });
                }
                EMPTY_ENUMERATION
            }
        };
        Ok(Self {
            name,
            low,
            high,
            init,
            description: None,
            enum_low,
            enum_high,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict enumeration to `[enum_low, enum_high]`.
    ///
    /// A non-empty range must lie within the declared range. An inverted
    /// range is accepted and enumerates nothing.
    pub fn with_enum_range(mut self, enum_low: i64, enum_high: i64) -> Result<Self, DeclError> {
        if enum_low <= enum_high {
            let upper_ok = match &self.high {
                Bound::Int(h) => enum_high <= *h,
                Bound::Const(_) => true,
            };
            if enum_low < self.low || !upper_ok {
                return Err(DeclError::EnumRangeOutOfBounds {
                    name: self.name,
                    enum_low,
                    enum_high,
                    low: self.low,
                    high: self.high,
                });
            }
        }
        self.enum_low = enum_low;
        self.enum_high = enum_high;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn low(&self) -> i64 {
        self.low
    }

    pub fn high(&self) -> &Bound {
        &self.high
    }

    pub fn init(&self) -> i64 {
        self.init
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Inclusive enumeration bounds; `low > high` means empty.
    pub fn enum_range(&self) -> (i64, i64) {
        (self.enum_low, self.enum_high)
    }

    /// Number of values enumeration visits for this variable.
    pub fn enum_len(&self) -> u64 {
        if self.enum_low > self.enum_high {
            0
        } else {
            self.enum_high.abs_diff(self.enum_low).saturating_add(1)
        }
    }

    pub fn enum_values(&self) -> std::ops::RangeInclusive<i64> {
        self.enum_low..=self.enum_high
    }
}

impl fmt::Display for BoundedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : [{}..{}] init {};",
            self.name, self.low, self.high, self.init
        )?;
        if let Some(desc) = &self.description {
            write!(f, " // {desc}")?;
        }
        Ok(())
    }
}

/// Wire form of a [`BoundedVariable`], validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub low: i64,
    pub high: Bound,
    pub init: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_low: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_high: Option<i64>,
}

impl TryFrom<VariableDecl> for BoundedVariable {
    type Error = DeclError;

    fn try_from(decl: VariableDecl) -> Result<Self, Self::Error> {
        let mut var = Self::build(decl.name, decl.low, decl.high, decl.init)?;
        if let Some(desc) = decl.description {
            var = var.with_description(desc);
        }
        if decl.enum_low.is_some() || decl.enum_high.is_some() {
            let (default_low, default_high) = var.enum_range();
            var = var.with_enum_range(
                decl.enum_low.unwrap_or(default_low),
                decl.enum_high.unwrap_or(default_high),
            )?;
        }
        Ok(var)
    }
}

impl From<BoundedVariable> for VariableDecl {
    fn from(var: BoundedVariable) -> Self {
        let default_range = match &var.high {
            Bound::Int(h) => (var.low, *h),
            Bound::Const(_) => EMPTY_ENUMERATION,
        };
        let explicit = (var.enum_low, var.enum_high) != default_range;
        VariableDecl {
            name: var.name,
            low: var.low,
            high: var.high,
            init: var.init,
            description: var.description,
            enum_low: explicit.then_some(var.enum_low),
            enum_high: explicit.then_some(var.enum_high),
        }
    }
}
