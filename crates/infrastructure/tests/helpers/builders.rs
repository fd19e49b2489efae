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

    pub fn response(mut self) -> Self {
        self.message.header.qr = true;
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

    fn record(mut self, section: Section, name: &str, ttl: u32, rtype: &str, args: &[&str]) -> Self {
        self.message
            .add_record_to(section, name, ttl, "IN", rtype, args)
            .unwrap();
        self
    }

    /// Adds `count` A records under distinct owner names.
    pub fn many_answers(mut self, count: usize) -> Self {
        for i in 0..count {
            let name = format!("host-{:04}.a-rather-long-subdomain.example.com", i);
            self = self.answer(&name, 60, "A", &["192.0.2.1"]);
        }
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}
