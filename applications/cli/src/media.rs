//! Console media element
//!
//! Stands in for a real audio output: every instruction from the player is
//! printed, and playback progress is simulated by the `tick` command.

use cadence_playback::MediaElement;
use std::io::Write;

pub struct ConsoleElement<W: Write> {
    out: W,
}

impl<W: Write> ConsoleElement<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        // A closed stdout is not worth failing playback over
        let _ = writeln!(self.out, "  media: {line}");
    }
}

impl<W: Write> MediaElement for ConsoleElement<W> {
    fn set_source(&mut self, file: &str) {
        self.emit(format_args!("load {file}"));
    }

    fn set_volume(&mut self, gain: f64) {
        self.emit(format_args!("volume {gain:.2}"));
    }

    fn seek(&mut self, position: f64) {
        self.emit(format_args!("seek {position:.1}s"));
    }

    fn play(&mut self) {
        self.emit(format_args!("play"));
    }

    fn pause(&mut self) {
        self.emit(format_args!("pause"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_each_instruction() {
        let mut element = ConsoleElement::new(Vec::new());
        element.set_source("/music/a.mp3");
        element.set_volume(0.5);
        element.seek(12.34);
        element.play();
        element.pause();

        let out = String::from_utf8(element.into_inner()).unwrap();
        assert_eq!(
            out,
            "  media: load /music/a.mp3\n  media: volume 0.50\n  media: seek 12.3s\n  media: play\n  media: pause\n"
        );
    }
}
