//! Stage registry
//!
//! A stage set is a closed, ordered list of named pipeline stages. The last
//! real stage is the `other` catch-all; after it comes the `void` sentinel,
//! which is active while nothing is being measured and is excluded from
//! every reported total.
//!
//! Stage sets are declared once with [`define_stages!`](crate::define_stages),
//! which keeps the identifiers and their display names in a single list.

use std::fmt;

/// An ordered, closed set of pipeline stages.
///
/// Indices are contiguous: real stages occupy `0..COUNT` (the last of them is
/// [`OTHER`](Self::OTHER)) and [`VOID`](Self::VOID) sits at `COUNT`.
pub trait StageSet: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Number of real stages, including the `other` catch-all.
    const COUNT: usize;
    /// The catch-all stage.
    const OTHER: Self;
    /// The "no stage active" sentinel.
    const VOID: Self;
    /// Every stage in index order, `VOID` last.
    const ALL: &'static [Self];

    /// Contiguous index of this stage.
    fn index(self) -> usize;

    /// Display name of this stage.
    fn name(self) -> &'static str;

    /// Stage at `index`, if any.
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Real stages (without `VOID`) in index order.
    fn real() -> &'static [Self] {
        &Self::ALL[..Self::COUNT]
    }

    /// Whether this is the `VOID` sentinel.
    fn is_void(self) -> bool {
        self == Self::VOID
    }
}

/// Declare a stage set.
///
/// The body lists the real stages in order, then the `#[other]` catch-all
/// and the `#[void]` sentinel. Each entry maps a variant to its display name.
///
/// # Example
///
/// ```rust
/// use time_profiler::{define_stages, StageSet};
///
/// define_stages! {
///     /// Stages of a toy encoder.
///     pub enum EncStage {
///         Analyse => "ANALYSE",
///         Entropy => "ENTROPY",
///         #[other] Other => "OTHER",
///         #[void] Idle => "IDLE",
///     }
/// }
///
/// assert_eq!(EncStage::COUNT, 3);
/// assert_eq!(EncStage::VOID.index(), 3);
/// assert_eq!(EncStage::Entropy.name(), "ENTROPY");
/// ```
#[macro_export]
macro_rules! define_stages {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $display:literal,)+
            #[other] $other:ident => $other_display:literal,
            #[void] $void:ident => $void_display:literal $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant,)+
            $other,
            $void,
        }

        impl $crate::StageSet for $name {
            const COUNT: usize = [$(stringify!($variant)),+].len() + 1;
            const OTHER: Self = Self::$other;
            const VOID: Self = Self::$void;
            const ALL: &'static [Self] = &[$(Self::$variant,)+ Self::$other, Self::$void];

            #[inline]
            fn index(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $display,)+
                    Self::$other => $other_display,
                    Self::$void => $void_display,
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::StageSet::name(*self))
            }
        }
    };
}

define_stages! {
    /// Stages of the video decoding pipeline.
    pub enum Stage {
        NaluSlicePicHl => "P_NALU_SLICE_PIC_HL",
        ControlParseDeriveLl => "P_CONTROL_PARSE_DERIVE_LL",
        ParseResiduals => "P_PARSERESIDUALS",
        IntraPred => "P_INTRAPRED",
        MotComp => "P_MOTCOMP",
        ITransRec => "P_ITRANS_REC",
        DbFilter => "P_DBFILTER",
        Sao => "P_SAO",
        Reshaper => "P_RESHAPER",
        Alf => "P_ALF",
        #[other] Other => "P_OTHER",
        #[void] Void => "P_VOID",
    }
}
