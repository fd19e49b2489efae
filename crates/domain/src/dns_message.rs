use std::fmt;

use crate::dns_header::Header;
use crate::dns_record::{RData, RecordClass, RecordType, ResourceRecord};
use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Name in presentation form; `"."` is the root.
    pub name: String,
    pub record_type: RecordType,
    pub class: RecordClass,
}

impl Question {
    pub fn new(name: impl Into<String>, record_type: RecordType, class: RecordClass) -> Self {
        Self {
            name: name.into(),
            record_type,
            class,
        }
    }
}

/// The three record sections that follow the question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Answer,
    Authority,
    Additional,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Answer => "ANSWER",
            Section::Authority => "AUTHORITY",
            Section::Additional => "ADDITIONAL",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory message: header, questions, and the three record sections.
///
/// Appending through the `add_*` methods keeps the header counts in step with
/// the section contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn new(id: u16) -> Self {
        Self {
            header: Header::new(id),
            ..Default::default()
        }
    }

    /// Starts a response carrying the request's id, opcode, rd flag and questions.
    pub fn response_to(request: &Message) -> Self {
        let mut response = Message::new(request.header.id);
        response.header.qr = true;
        response.header.opcode = request.header.opcode;
        response.header.rd = request.header.rd;
        response.header.cd = request.header.cd;
        for question in &request.questions {
            response.push_question(question.clone());
        }
        response
    }

    /// Applies header field updates; counts are owned by the message and left alone.
    pub fn set_header(&mut self, update: impl FnOnce(&mut Header)) {
        let counts = (
            self.header.qdcount,
            self.header.ancount,
            self.header.nscount,
            self.header.arcount,
        );
        update(&mut self.header);
        (
            self.header.qdcount,
            self.header.ancount,
            self.header.nscount,
            self.header.arcount,
        ) = counts;
    }

    pub fn add_question(
        &mut self,
        name: impl Into<String>,
        type_name: &str,
        class_name: &str,
    ) -> Result<&mut Question, DomainError> {
        let record_type: RecordType = type_name.parse()?;
        let class: RecordClass = class_name.parse()?;
        Ok(self.push_question(Question::new(name, record_type, class)))
    }

    pub fn push_question(&mut self, question: Question) -> &mut Question {
        self.questions.push(question);
        self.header.qdcount = self.questions.len() as u16;
        let last = self.questions.len() - 1;
        &mut self.questions[last]
    }

    /// Appends an answer built from mnemonic names and positional payload arguments.
    pub fn add_record(
        &mut self,
        name: impl Into<String>,
        ttl: u32,
        class_name: &str,
        type_name: &str,
        args: &[&str],
    ) -> Result<&mut ResourceRecord, DomainError> {
        self.add_record_to(Section::Answer, name, ttl, class_name, type_name, args)
    }

    pub fn add_record_to(
        &mut self,
        section: Section,
        name: impl Into<String>,
        ttl: u32,
        class_name: &str,
        type_name: &str,
        args: &[&str],
    ) -> Result<&mut ResourceRecord, DomainError> {
        let record = ResourceRecord::from_args(name, ttl, class_name, type_name, args)?;
        Ok(self.push_record(section, record))
    }

    pub fn add_rdata(
        &mut self,
        section: Section,
        name: impl Into<String>,
        ttl: u32,
        class: RecordClass,
        record_type: RecordType,
        rdata: RData,
    ) -> Result<&mut ResourceRecord, DomainError> {
        let record = ResourceRecord::new(name, record_type, class, ttl, rdata)?;
        Ok(self.push_record(section, record))
    }

    pub fn push_record(&mut self, section: Section, record: ResourceRecord) -> &mut ResourceRecord {
        let list = self.section_mut(section);
        list.push(record);
        let len = list.len();
        self.sync_counts();
        let list = self.section_mut(section);
        &mut list[len - 1]
    }

    pub fn section(&self, section: Section) -> &[ResourceRecord] {
        match section {
            Section::Answer => &self.answers,
            Section::Authority => &self.authority,
            Section::Additional => &self.additional,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut Vec<ResourceRecord> {
        match section {
            Section::Answer => &mut self.answers,
            Section::Authority => &mut self.authority,
            Section::Additional => &mut self.additional,
        }
    }

    /// All records in wire order: answers, then authority, then additional.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
    }

    pub fn record_count(&self) -> usize {
        self.answers.len() + self.authority.len() + self.additional.len()
    }

    /// Rewrites the header counts from the section lengths.
    pub fn sync_counts(&mut self) {
        self.header.qdcount = self.questions.len() as u16;
        self.header.ancount = self.answers.len() as u16;
        self.header.nscount = self.authority.len() as u16;
        self.header.arcount = self.additional.len() as u16;
    }

    pub fn is_response(&self) -> bool {
        self.header.qr
    }
}
