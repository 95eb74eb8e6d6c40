//! Interactive features: annotations, form widgets, page transitions,
//! sub-page navigation and document outlines.

pub(crate) mod annotation;
pub(crate) mod form;
pub(crate) mod navigation;
pub(crate) mod outline;

pub use annotation::{Annotation, AnnotationKind};
pub use navigation::{SubPageNavigation, Transition, TransitionStyle};
