//! Logical structure.
//!
//! Structure items form a tree: every item is an indirect object created up
//! front, while its dictionary is only written during finalization, when
//! the pages (and marked-content ids) that reference it are known. User
//! defined roles are declared through the role map and always resolve to a
//! builtin structure type.

use pdf_writer::types::StructRole;
use pdf_writer::writers::StructElement;
use pdf_writer::{Name, Ref};

use crate::serialize::{RoleId, StructureItemId};

/// The builtin structure element types of PDF 1.7.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum StructureType {
    Document,
    Part,
    Art,
    Sect,
    Div,
    BlockQuote,
    Caption,
    Toc,
    Toci,
    Index,
    NonStruct,
    Private,
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    L,
    Li,
    Lbl,
    LBody,
    Table,
    Tr,
    Th,
    Td,
    THead,
    TBody,
    TFoot,
    Span,
    Quote,
    Note,
    Reference,
    BibEntry,
    Code,
    Link,
    Annot,
    Figure,
    Formula,
    Form,
}

impl StructureType {
    /// The tag written as the `BDC` operand for content belonging to an
    /// item of this type.
    pub(crate) fn name(self) -> &'static str {
        match self {
            StructureType::Document => "Document",
            StructureType::Part => "Part",
            StructureType::Art => "Art",
            StructureType::Sect => "Sect",
            StructureType::Div => "Div",
            StructureType::BlockQuote => "BlockQuote",
            StructureType::Caption => "Caption",
            StructureType::Toc => "TOC",
            StructureType::Toci => "TOCI",
            StructureType::Index => "Index",
            StructureType::NonStruct => "NonStruct",
            StructureType::Private => "Private",
            StructureType::P => "P",
            StructureType::H1 => "H1",
            StructureType::H2 => "H2",
            StructureType::H3 => "H3",
            StructureType::H4 => "H4",
            StructureType::H5 => "H5",
            StructureType::H6 => "H6",
            StructureType::L => "L",
            StructureType::Li => "LI",
            StructureType::Lbl => "Lbl",
            StructureType::LBody => "LBody",
            StructureType::Table => "Table",
            StructureType::Tr => "TR",
            StructureType::Th => "TH",
            StructureType::Td => "TD",
            StructureType::THead => "THead",
            StructureType::TBody => "TBody",
            StructureType::TFoot => "TFoot",
            StructureType::Span => "Span",
            StructureType::Quote => "Quote",
            StructureType::Note => "Note",
            StructureType::Reference => "Reference",
            StructureType::BibEntry => "BibEntry",
            StructureType::Code => "Code",
            StructureType::Link => "Link",
            StructureType::Annot => "Annot",
            StructureType::Figure => "Figure",
            StructureType::Formula => "Formula",
            StructureType::Form => "Form",
        }
    }

    pub(crate) fn to_struct_role(self) -> StructRole {
        match self {
            StructureType::Document => StructRole::Document,
            StructureType::Part => StructRole::Part,
            StructureType::Art => StructRole::Art,
            StructureType::Sect => StructRole::Sect,
            StructureType::Div => StructRole::Div,
            StructureType::BlockQuote => StructRole::BlockQuote,
            StructureType::Caption => StructRole::Caption,
            StructureType::Toc => StructRole::TOC,
            StructureType::Toci => StructRole::TOCI,
            StructureType::Index => StructRole::Index,
            StructureType::NonStruct => StructRole::NonStruct,
            StructureType::Private => StructRole::Private,
            StructureType::P => StructRole::P,
            StructureType::H1 => StructRole::H1,
            StructureType::H2 => StructRole::H2,
            StructureType::H3 => StructRole::H3,
            StructureType::H4 => StructRole::H4,
            StructureType::H5 => StructRole::H5,
            StructureType::H6 => StructRole::H6,
            StructureType::L => StructRole::L,
            StructureType::Li => StructRole::LI,
            StructureType::Lbl => StructRole::Lbl,
            StructureType::LBody => StructRole::LBody,
            StructureType::Table => StructRole::Table,
            StructureType::Tr => StructRole::TR,
            StructureType::Th => StructRole::TH,
            StructureType::Td => StructRole::TD,
            StructureType::THead => StructRole::THead,
            StructureType::TBody => StructRole::TBody,
            StructureType::TFoot => StructRole::TFoot,
            StructureType::Span => StructRole::Span,
            StructureType::Quote => StructRole::Quote,
            StructureType::Note => StructRole::Note,
            StructureType::Reference => StructRole::Reference,
            StructureType::BibEntry => StructRole::BibEntry,
            StructureType::Code => StructRole::Code,
            StructureType::Link => StructRole::Link,
            StructureType::Annot => StructRole::Annot,
            StructureType::Figure => StructRole::Figure,
            StructureType::Formula => StructRole::Formula,
            StructureType::Form => StructRole::Form,
        }
    }
}

/// What a structure item is tagged as.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum StructureItemKind {
    Builtin(StructureType),
    Role(RoleId),
}

/// Where a structure item was referenced from a content stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct StructureUsage {
    pub(crate) page_index: usize,
    pub(crate) mcid: i32,
}

/// A structure item, created during authoring and written at finalization.
#[derive(Debug, Clone)]
pub(crate) struct StructureItem {
    pub(crate) ref_: Ref,
    pub(crate) kind: StructureItemKind,
    pub(crate) parent: Option<StructureItemId>,
    pub(crate) usage: Option<StructureUsage>,
}

/// An entry of the role map.
#[derive(Debug, Clone)]
pub(crate) struct RoleMapEntry {
    pub(crate) name: String,
    pub(crate) builtin: StructureType,
}

/// Write the `/S` entry of one structure element.
pub(crate) fn write_kind(
    elem: &mut StructElement,
    kind: StructureItemKind,
    role_map: &[RoleMapEntry],
) {
    match kind {
        StructureItemKind::Builtin(ty) => {
            elem.kind(ty.to_struct_role());
        }
        StructureItemKind::Role(role) => {
            elem.custom_kind(Name(role_map[role.0].name.as_bytes()));
        }
    }
}
