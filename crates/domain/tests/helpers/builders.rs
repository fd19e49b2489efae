#![allow(dead_code)]
use dnswire_domain::{Message, Section};

pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn new(id: u16) -> Self {
        Self {
            message: Message::new(id),
        }
    }

    pub fn recursion_desired(mut self) -> Self {
        self.message.header.rd = true;
        self
    }

    pub fn question(mut self, name: &str, rtype: &str) -> Self {
        self.message.add_question(name, rtype, "IN").unwrap();
        self
    }

    pub fn answer(self, name: &str, ttl: u32, rtype: &str, args: &[&str]) -> Self {
        self.record(Section::Answer, name, ttl, rtype, args)
    }

    pub fn authority(self, name: &str, ttl: u32, rtype: &str, args: &[&str]) -> Self {
        self.record(Section::Authority, name, ttl, rtype, args)
    }

    pub fn additional(self, name: &str, ttl: u32, rtype: &str, args: &[&str]) -> Self {
        self.record(Section::Additional, name, ttl, rtype, args)
    }

    pub fn record(
        mut self,
        section: Section,
        name: &str,
        ttl: u32,
        rtype: &str,
        args: &[&str],
    ) -> Self {
        self.message
            .add_record_to(section, name, ttl, "IN", rtype, args)
            .unwrap();
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}
