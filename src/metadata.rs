//! Document metadata.
//!
//! Metadata feeds two places: the document information dictionary and,
//! unless disabled, an XMP metadata stream referenced from the catalog.
//! Dates are caller-provided so that the output stays deterministic.

use pdf_writer::{Date, Finish, Name, Pdf, Ref, TextStr};
use xmp_writer::XmpWriter;

use crate::document::IntentSubtype;

/// A date and time, in the local time zone given by the UTC offset.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DateTime {
    year: u16,
    month: Option<u8>,
    day: Option<u8>,
    hour: Option<u8>,
    minute: Option<u8>,
    second: Option<u8>,
    utc_offset_hour: Option<i8>,
    utc_offset_minute: u8,
}

impl DateTime {
    /// Create a new date for the given year.
    pub fn new(year: u16) -> Self {
        Self {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            utc_offset_hour: None,
            utc_offset_minute: 0,
        }
    }

    /// Set the month (1–12).
    pub fn month(mut self, month: u8) -> Self {
        self.month = Some(month);
        self
    }

    /// Set the day (1–31).
    pub fn day(mut self, day: u8) -> Self {
        self.day = Some(day);
        self
    }

    /// Set the hour (0–23).
    pub fn hour(mut self, hour: u8) -> Self {
        self.hour = Some(hour);
        self
    }

    /// Set the minute (0–59).
    pub fn minute(mut self, minute: u8) -> Self {
        self.minute = Some(minute);
        self
    }

    /// Set the second (0–59).
    pub fn second(mut self, second: u8) -> Self {
        self.second = Some(second);
        self
    }

    /// Set the UTC offset hour.
    pub fn utc_offset_hour(mut self, hour: i8) -> Self {
        self.utc_offset_hour = Some(hour);
        self
    }

    /// Set the UTC offset minute.
    pub fn utc_offset_minute(mut self, minute: u8) -> Self {
        self.utc_offset_minute = minute;
        self
    }

    fn to_pdf_date(self) -> Date {
        let mut date = Date::new(self.year);

        if let Some(month) = self.month {
            date = date.month(month);
        }
        if let Some(day) = self.day {
            date = date.day(day);
        }
        if let Some(hour) = self.hour {
            date = date.hour(hour);
        }
        if let Some(minute) = self.minute {
            date = date.minute(minute);
        }
        if let Some(second) = self.second {
            date = date.second(second);
        }
        if let Some(offset_hour) = self.utc_offset_hour {
            date = date
                .utc_offset_hour(offset_hour)
                .utc_offset_minute(self.utc_offset_minute);
        }

        date
    }
}

/// Metadata for a PDF document.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) creator: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) creation_date: Option<DateTime>,
    pub(crate) modification_date: Option<DateTime>,
}

impl Metadata {
    /// Create new, empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// The title of the document.
    pub fn title(mut self, title: String) -> Self {
        if !title.is_empty() {
            self.title = Some(title);
        }
        self
    }

    /// The author of the document.
    pub fn author(mut self, author: String) -> Self {
        if !author.is_empty() {
            self.author = Some(author);
        }
        self
    }

    /// The tool that created the content of the document.
    pub fn creator(mut self, creator: String) -> Self {
        if !creator.is_empty() {
            self.creator = Some(creator);
        }
        self
    }

    /// The main language of the document, as an RFC 3066 tag.
    pub fn language(mut self, language: String) -> Self {
        if !language.is_empty() {
            self.language = Some(language);
        }
        self
    }

    /// The creation date of the document.
    pub fn creation_date(mut self, date: DateTime) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// The modification date of the document.
    pub fn modification_date(mut self, date: DateTime) -> Self {
        self.modification_date = Some(date);
        self
    }

    pub(crate) fn producer() -> String {
        concat!("platen ", env!("CARGO_PKG_VERSION")).to_string()
    }

    /// Write the document information dictionary.
    pub(crate) fn serialize_document_info(
        &self,
        ref_: Ref,
        pdf: &mut Pdf,
        subtype: Option<IntentSubtype>,
    ) {
        let mut info = pdf.document_info(ref_);

        if let Some(title) = &self.title {
            info.title(TextStr(title));
        }
        if let Some(author) = &self.author {
            info.author(TextStr(author));
        }
        if let Some(creator) = &self.creator {
            info.creator(TextStr(creator));
        }

        let producer = Self::producer();
        info.producer(TextStr(&producer));

        if let Some(date) = self.creation_date {
            info.creation_date(date.to_pdf_date());
        }
        if let Some(date) = self.modification_date {
            info.modified_date(date.to_pdf_date());
        }

        info.pair(Name(b"Trapped"), Name(b"False"));

        if subtype == Some(IntentSubtype::PdfX) {
            info.pair(Name(b"GTS_PDFXVersion"), pdf_writer::Str(b"PDF/X-3:2003"));
        }

        info.finish();
    }

    /// Mirror the information dictionary into XMP.
    pub(crate) fn serialize_xmp_metadata(&self, xmp: &mut XmpWriter) {
        if let Some(title) = &self.title {
            xmp.title([(None, title.as_str())]);
        }
        if let Some(author) = &self.author {
            xmp.creator([author.as_str()]);
        }
        if let Some(creator) = &self.creator {
            xmp.creator_tool(creator);
        }

        let producer = Self::producer();
        xmp.producer(&producer);
    }
}
