//! Error handling.
//!
//! All fallible operations in this crate return [`Result`]. Errors are plain
//! values; the library never tries to recover internally, every failure
//! bubbles up to the authoring call that caused it.

/// A result type using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An error produced while building a PDF document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A color component lies outside the valid [0, 1] range.
    #[error("color component out of range")]
    ColorOutOfRange,
    /// A color does not match the color space it is used in.
    #[error("color does not match the active color space")]
    ColorspaceMismatch,
    /// An output intent was requested without an output ICC profile.
    #[error("output intent requires an output ICC profile")]
    OutputProfileMissing,
    /// An output intent was requested without a condition identifier.
    #[error("output intent requires a condition identifier")]
    MissingIntentIdentifier,
    /// A form widget or annotation was attached to more than one page.
    #[error("annotation or form widget is already used on another page")]
    AnnotationReuse,
    /// A structure item was referenced from more than one page.
    #[error("structure item is already used on another page")]
    StructureReuse,
    /// A role map name starts with a slash.
    #[error("role names must not start with a slash")]
    SlashStart,
    /// A role map name was registered twice.
    #[error("role is already defined")]
    RoleAlreadyDefined,
    /// An image has a zero or negative dimension.
    #[error("invalid image size")]
    InvalidImageSize,
    /// An image carries no pixel data.
    #[error("image has no pixels")]
    MissingPixels,
    /// A stencil mask image also carries an alpha channel.
    #[error("an image can not be both a mask and carry an alpha channel")]
    MaskAndAlpha,
    /// The given data is in a format this crate does not support.
    #[error("unsupported format")]
    UnsupportedFormat,
    /// A CMYK operation was requested without a CMYK output profile.
    #[error("no CMYK output profile configured")]
    NoCmykProfile,
    /// A surface operation that is only valid for a different surface flavor.
    #[error("operation is not valid for this draw context type")]
    InvalidDrawContextType,
    /// A surface was finished while marked content or another draw state was
    /// still open.
    #[error("unclosed marked content or graphics state at serialization")]
    UnclosedMarkedContent,
    /// Marked content was begun inside an already open marked-content
    /// sequence.
    #[error("marked content can not be nested")]
    NestedBMC,
    /// A draw state was closed that does not match the innermost open state.
    #[error("mismatched draw state end")]
    DrawStateEndMismatch,
    /// A font file could not be parsed.
    #[error("font file could not be parsed")]
    InvalidFont,
    /// A codepoint has no glyph in the selected font.
    #[error("font has no glyph for the requested codepoint")]
    MissingGlyph,
    /// An annotation is missing its bounding rectangle.
    #[error("annotation is missing a rectangle")]
    AnnotationMissingRect,
    /// A mesh shading contains an out-of-range element flag.
    #[error("malformed shading data")]
    MalformedShading,
}
