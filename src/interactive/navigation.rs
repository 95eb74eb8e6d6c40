//! Page transitions and sub-page navigation.
//!
//! Sub-page navigation flips a sequence of optional content groups on, one
//! per navigation step, by chaining `/NavNode` dictionaries from the page's
//! `/PresSteps` entry. All node references are allocated before any node is
//! written, so the links within the chain are ordinary forward references.

use pdf_writer::{Chunk, Dict, Finish, Name, Ref};

use crate::serialize::OcgId;

/// The visual style of a page transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum TransitionStyle {
    Split,
    Blinds,
    Box,
    Wipe,
    Dissolve,
    Glitter,
    R,
    Fly,
    Push,
    Cover,
    Uncover,
    Fade,
}

impl TransitionStyle {
    fn to_pdf_name(self) -> Name<'static> {
        match self {
            TransitionStyle::Split => Name(b"Split"),
            TransitionStyle::Blinds => Name(b"Blinds"),
            TransitionStyle::Box => Name(b"Box"),
            TransitionStyle::Wipe => Name(b"Wipe"),
            TransitionStyle::Dissolve => Name(b"Dissolve"),
            TransitionStyle::Glitter => Name(b"Glitter"),
            TransitionStyle::R => Name(b"R"),
            TransitionStyle::Fly => Name(b"Fly"),
            TransitionStyle::Push => Name(b"Push"),
            TransitionStyle::Cover => Name(b"Cover"),
            TransitionStyle::Uncover => Name(b"Uncover"),
            TransitionStyle::Fade => Name(b"Fade"),
        }
    }
}

/// A page or navigation transition (`/Trans`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    /// The transition style.
    pub style: TransitionStyle,
    /// The duration in seconds.
    pub duration: Option<f32>,
    /// Whether the transition moves horizontally (`true`) or vertically.
    /// Only meaningful for some styles.
    pub horizontal: Option<bool>,
    /// Whether the transition moves inward (`true`) or outward.
    pub inward: Option<bool>,
    /// The direction in degrees, counterclockwise from left-to-right.
    pub direction: Option<i32>,
    /// The starting scale for `Fly` transitions.
    pub scale: Option<f32>,
    /// Whether the area outside the flying content is opaque.
    pub opaque: Option<bool>,
}

impl Transition {
    pub(crate) fn write_into(&self, dict: &mut Dict) {
        dict.pair(Name(b"Type"), Name(b"Trans"));
        dict.pair(Name(b"S"), self.style.to_pdf_name());
        if let Some(duration) = self.duration {
            dict.pair(Name(b"D"), duration);
        }
        if let Some(horizontal) = self.horizontal {
            dict.pair(
                Name(b"Dm"),
                if horizontal { Name(b"H") } else { Name(b"V") },
            );
        }
        if let Some(inward) = self.inward {
            dict.pair(Name(b"M"), if inward { Name(b"I") } else { Name(b"O") });
        }
        if let Some(direction) = self.direction {
            dict.pair(Name(b"Di"), direction);
        }
        if let Some(scale) = self.scale {
            dict.pair(Name(b"SS"), scale);
        }
        if let Some(opaque) = self.opaque {
            dict.pair(Name(b"B"), opaque);
        }
    }
}

/// One step of a page's sub-page navigation: the layer to reveal and an
/// optional transition to play while revealing it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SubPageNavigation {
    /// The optional content group that this step turns on.
    pub ocg: OcgId,
    /// The transition played when stepping forward onto this step.
    pub transition: Option<Transition>,
}

/// A navigation step with its OCG handle resolved to an object reference.
pub(crate) struct ResolvedNavigation {
    pub(crate) ocg: Ref,
    pub(crate) transition: Option<Transition>,
}

/// Serialize the `/PresSteps` chain for one page.
///
/// `refs` must hold `navs.len() + 2` pre-allocated references: the root
/// node, one node per step and the tail node. Returns the chunk holding all
/// nodes; the root node is `refs[0]`.
pub(crate) fn serialize_navigation(refs: &[Ref], navs: &[ResolvedNavigation]) -> Chunk {
    assert_eq!(refs.len(), navs.len() + 2);

    let mut chunk = Chunk::new();

    let root_ref = refs[0];
    let tail_ref = refs[refs.len() - 1];

    // The root turns every layer off when entered forward and every layer
    // on when entered backward.
    {
        let mut root = chunk.indirect(root_ref).dict();
        root.pair(Name(b"Type"), Name(b"NavNode"));

        let mut forward = root.insert(Name(b"NA")).dict();
        forward.pair(Name(b"S"), Name(b"SetOCGState"));
        let mut state = forward.insert(Name(b"State")).array();
        state.item(Name(b"OFF"));
        for nav in navs {
            state.item(nav.ocg);
        }
        state.finish();
        forward.finish();

        let mut backward = root.insert(Name(b"PA")).dict();
        backward.pair(Name(b"S"), Name(b"SetOCGState"));
        let mut state = backward.insert(Name(b"State")).array();
        state.item(Name(b"ON"));
        for nav in navs {
            state.item(nav.ocg);
        }
        state.finish();
        backward.finish();

        root.pair(Name(b"Next"), refs[1]);
        root.pair(Name(b"Prev"), tail_ref);
        root.finish();
    }

    for (i, nav) in navs.iter().enumerate() {
        let mut node = chunk.indirect(refs[i + 1]).dict();
        node.pair(Name(b"Type"), Name(b"NavNode"));

        let mut forward = node.insert(Name(b"NA")).dict();
        forward.pair(Name(b"S"), Name(b"SetOCGState"));
        let mut state = forward.insert(Name(b"State")).array();
        state.item(Name(b"ON"));
        state.item(nav.ocg);
        state.finish();

        if let Some(transition) = &nav.transition {
            let mut next_action = forward.insert(Name(b"Next")).dict();
            next_action.pair(Name(b"S"), Name(b"Trans"));
            let mut trans = next_action.insert(Name(b"Trans")).dict();
            transition.write_into(&mut trans);
            trans.finish();
            next_action.finish();
        }

        forward.finish();

        node.pair(Name(b"Next"), refs[i + 2]);

        if i > 0 {
            let mut backward = node.insert(Name(b"PA")).dict();
            backward.pair(Name(b"S"), Name(b"SetOCGState"));
            let mut state = backward.insert(Name(b"State")).array();
            state.item(Name(b"OFF"));
            state.item(navs[i - 1].ocg);
            state.finish();
            backward.finish();

            node.pair(Name(b"Prev"), refs[i]);
        }

        node.finish();
    }

    // The tail turns the last layer off again when stepping backward onto
    // the final step.
    {
        let mut tail = chunk.indirect(tail_ref).dict();
        tail.pair(Name(b"Type"), Name(b"NavNode"));

        let mut backward = tail.insert(Name(b"PA")).dict();
        backward.pair(Name(b"S"), Name(b"SetOCGState"));
        let mut state = backward.insert(Name(b"State")).array();
        state.item(Name(b"OFF"));
        state.item(navs[navs.len() - 1].ocg);
        state.finish();
        backward.finish();

        tail.pair(Name(b"Prev"), refs[refs.len() - 2]);
        tail.finish();
    }

    chunk
}
