//! Protocol commands
//!
//! Defines the Open Interface commands and their validated constructors.
//!
//! Every constructor checks its own parameter domain and either returns a
//! complete command or a [`CommandError`]. A command never carries a partial
//! encoding.

use serde::{Deserialize, Serialize};

use super::command_builder::{frame, PayloadBuilder};
use super::{BaudRate, CommandError};

/// Velocity limits in mm/s
const VELOCITY_MIN: i32 = -500;
const VELOCITY_MAX: i32 = 500;

/// Turn radius limits in mm
const RADIUS_MIN: i32 = -2000;
const RADIUS_MAX: i32 = 2000;

/// Radius field value meaning "drive straight"
const RADIUS_STRAIGHT: u16 = 0x8000;
/// Radius field value for an in-place clockwise spin
const RADIUS_SPIN_CW: u16 = 0xFFFF;
/// Radius field value for an in-place counter-clockwise spin
const RADIUS_SPIN_CCW: u16 = 0x0001;

/// Highest song slot number
const SONG_NUMBER_MAX: i32 = 15;
/// Notes allowed per song
const SONG_NOTES_MIN: usize = 1;
const SONG_NOTES_MAX: usize = 16;

/// Full duty cycle for a low side driver
const DRIVER_DUTY_MAX: i32 = 128;

/// Digital outputs mask covers pins 19, 7 and 20
const DIGITAL_OUTPUTS_MAX: i32 = 0x07;

/// Advance LED flag (bit 3)
const LED_ADVANCE: u8 = 1 << 3;
/// Play LED flag (bit 1)
const LED_PLAY: u8 = 1 << 1;

/// Demo payload that aborts the running demo
const DEMO_ABORT: u8 = 255;

/// OI opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Start the OI (Passive mode)
    Start = 128,
    /// Change baud rate
    Baud = 129,
    /// Enter Safe mode
    Safe = 131,
    /// Enter Full mode
    Full = 132,
    /// Run or abort a built-in demo
    Demo = 136,
    /// Velocity and turn radius
    Drive = 137,
    /// Advance, Play and power LEDs
    Leds = 139,
    /// Program a song slot
    Song = 140,
    /// Play a song slot
    PlaySong = 141,
    /// Low side driver duty cycles
    PwmLowSideDrivers = 144,
    /// Per-wheel velocities
    DriveDirect = 145,
    /// Cargo bay digital outputs
    DigitalOutputs = 147,
    /// Emit an IR byte
    SendIr = 151,
}

impl Opcode {
    /// Wire value of this opcode
    pub fn byte(self) -> u8 {
        self as u8
    }
}

/// Built-in demos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Demo {
    /// Cover the room with a mix of behaviours
    Cover = 0,
    /// Cover, then seek the Home Base when its beam is seen
    CoverAndDock = 1,
    /// Spiral cover of a small area
    SpotCover = 2,
    /// Follow walls and corners
    Mouse = 3,
    /// Continuous figure eight
    FigureEight = 4,
    /// Drive forward while pushed, away when touched
    Wimp = 5,
    /// Drive toward a virtual wall
    Home = 6,
    /// Cycle between virtual walls
    Tag = 7,
    /// Play Pachelbel's Canon, one note per cliff sensor
    Pachelbel = 8,
    /// Play chords from the bumpers and cliff sensors
    Banjo = 9,
}

impl Demo {
    /// All demos in number order
    pub const ALL: [Demo; 10] = [
        Demo::Cover,
        Demo::CoverAndDock,
        Demo::SpotCover,
        Demo::Mouse,
        Demo::FigureEight,
        Demo::Wimp,
        Demo::Home,
        Demo::Tag,
        Demo::Pachelbel,
        Demo::Banjo,
    ];

    /// Demo number sent in the command payload
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Demo {
    type Error = CommandError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Demo::ALL
            .get(number as usize)
            .copied()
            .ok_or(CommandError::InvalidDemo(number))
    }
}

/// A single MIDI-style note
///
/// Tones below 31 or above 127 play as rests. Duration is in 1/64 s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI note number
    pub tone: u8,
    /// Length in 1/64 s
    pub duration: u8,
}

impl Note {
    /// A note of `tone` lasting `duration` sixty-fourths of a second
    pub fn new(tone: u8, duration: u8) -> Self {
        Self { tone, duration }
    }

    /// A silent note of the given duration
    pub fn rest(duration: u8) -> Self {
        Self { tone: 0, duration }
    }

    /// Whether this note plays as silence
    pub fn is_rest(&self) -> bool {
        self.tone < 31 || self.tone > 127
    }
}

/// How long to wait for a reply to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTimeout {
    /// No reply expected
    None,
    /// A single reply within the given milliseconds
    Single(u64),
    /// A repeating (streamed) reply
    Streaming,
}

/// A validated OI command
///
/// Only the constructors below can build one, so every command carries a
/// complete payload and a Baud opcode always travels with its target rate.
///
/// ```compile_fail
/// use createoi_core::protocol::{Command, Opcode};
///
/// // truncated Drive payload
/// let _ = Command::Simple { opcode: Opcode::Drive, payload: vec![0x7F] };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(Kind);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Written as-is
    Simple { opcode: Opcode, payload: Vec<u8> },
    /// Written, then the connection switches to `rate`
    Baud { rate: BaudRate },
}

impl Command {
    fn simple(opcode: Opcode, payload: Vec<u8>) -> Self {
        debug_assert_ne!(opcode, Opcode::Baud);
        Command(Kind::Simple { opcode, payload })
    }

    /// Opcode byte this command starts with
    pub fn opcode(&self) -> Opcode {
        match &self.0 {
            Kind::Simple { opcode, .. } => *opcode,
            Kind::Baud { .. } => Opcode::Baud,
        }
    }

    /// Wire bytes: opcode followed by the payload
    pub fn encode(&self) -> Vec<u8> {
        match &self.0 {
            Kind::Simple { opcode, payload } => frame(opcode.byte(), payload),
            Kind::Baud { rate } => frame(Opcode::Baud.byte(), &[rate.code()]),
        }
    }

    /// Target rate if this command switches the baud rate
    pub fn baud_change(&self) -> Option<BaudRate> {
        match &self.0 {
            Kind::Baud { rate } => Some(*rate),
            Kind::Simple { .. } => None,
        }
    }

    /// Check if this command expects a response
    pub fn expects_response(&self) -> bool {
        false
    }

    /// Reply wait for this command; no OI command here has a reply
    pub fn response_timeout(&self) -> ResponseTimeout {
        ResponseTimeout::None
    }

    /// "Start": initialise the OI, entering Passive mode
    pub fn start() -> Self {
        Self::simple(Opcode::Start, Vec::new())
    }

    /// "Safe": enter Safe mode
    pub fn safe() -> Self {
        Self::simple(Opcode::Safe, Vec::new())
    }

    /// "Full": enter Full control mode
    pub fn full() -> Self {
        Self::simple(Opcode::Full, Vec::new())
    }

    /// "Baud": change the connection baud rate
    ///
    /// `rate` must be one of 300, 600, 1200, 2400, 4800, 9600, 14400, 19200,
    /// 28800, 38400, 57600 or 115200.
    pub fn baud(rate: u32) -> Result<Self, CommandError> {
        let rate = BaudRate::try_from(rate)?;
        Ok(Command(Kind::Baud { rate }))
    }

    /// "Demo": run one of the built-in demos
    pub fn demo(demo: Demo) -> Self {
        Self::simple(Opcode::Demo, vec![demo.number()])
    }

    /// "Demo" with the abort value, stopping the current demo
    pub fn abort_demo() -> Self {
        Self::simple(Opcode::Demo, vec![DEMO_ABORT])
    }

    /// "Drive": move with `velocity` (mm/s) along a turn of `radius` (mm)
    pub fn drive(velocity: i16, radius: i16) -> Result<Self, CommandError> {
        check_velocity("velocity", velocity)?;
        CommandError::check_range("radius", radius.into(), RADIUS_MIN, RADIUS_MAX)?;

        let payload = PayloadBuilder::with_capacity(4)
            .i16(velocity)
            .i16(radius)
            .build();
        Ok(Self::simple(Opcode::Drive, payload))
    }

    /// "Drive" in a straight line
    pub fn drive_straight(velocity: i16) -> Result<Self, CommandError> {
        check_velocity("velocity", velocity)?;

        let payload = PayloadBuilder::with_capacity(4)
            .i16(velocity)
            .u16(RADIUS_STRAIGHT)
            .build();
        Ok(Self::simple(Opcode::Drive, payload))
    }

    /// "Drive" as an in-place spin
    pub fn spin(velocity: i16, clockwise: bool) -> Result<Self, CommandError> {
        check_velocity("velocity", velocity)?;

        let radius = if clockwise {
            RADIUS_SPIN_CW
        } else {
            RADIUS_SPIN_CCW
        };
        let payload = PayloadBuilder::with_capacity(4)
            .i16(velocity)
            .u16(radius)
            .build();
        Ok(Self::simple(Opcode::Drive, payload))
    }

    /// "Drive Direct": independent wheel velocities, right wheel first
    pub fn drive_direct(right: i16, left: i16) -> Result<Self, CommandError> {
        check_velocity("right velocity", right)?;
        check_velocity("left velocity", left)?;

        let payload = PayloadBuilder::with_capacity(4).i16(right).i16(left).build();
        Ok(Self::simple(Opcode::DriveDirect, payload))
    }

    /// "LEDs": set the Advance and Play LEDs and the power LED
    ///
    /// Flag byte: Advance is bit 3, Play is bit 1. `power_colour` runs from
    /// green (0) to red (255) and `power_intensity` from off (0) to full (255).
    pub fn leds(advance: bool, play: bool, power_colour: u8, power_intensity: u8) -> Self {
        let mut bits = 0u8;
        if advance {
            bits |= LED_ADVANCE;
        }
        if play {
            bits |= LED_PLAY;
        }
        Self::simple(Opcode::Leds, vec![bits, power_colour, power_intensity])
    }

    /// "Digital Outputs": bit 0 is pin 19, bit 1 is pin 7, bit 2 is pin 20
    pub fn digital_outputs(bits: u8) -> Result<Self, CommandError> {
        CommandError::check_range("digital outputs", bits.into(), 0, DIGITAL_OUTPUTS_MAX)?;
        Ok(Self::simple(Opcode::DigitalOutputs, vec![bits]))
    }

    /// "PWM Low Side Drivers": duty cycles from 0 (off) to 128 (100%)
    pub fn pwm_low_side_drivers(driver0: u8, driver1: u8, driver2: u8) -> Result<Self, CommandError> {
        CommandError::check_range("driver 0 duty", driver0.into(), 0, DRIVER_DUTY_MAX)?;
        CommandError::check_range("driver 1 duty", driver1.into(), 0, DRIVER_DUTY_MAX)?;
        CommandError::check_range("driver 2 duty", driver2.into(), 0, DRIVER_DUTY_MAX)?;

        // Wire order is driver 2 first.
        Ok(Self::simple(
            Opcode::PwmLowSideDrivers,
            vec![driver2, driver1, driver0],
        ))
    }

    /// "Send IR": emit `value` on low side driver 1 in the Create IR format
    ///
    /// Needs the external circuitry described in the OI manual.
    pub fn send_ir(value: u8) -> Self {
        Self::simple(Opcode::SendIr, vec![value])
    }

    /// "Song": program song slot `number` with up to 16 notes
    pub fn song(number: u8, notes: &[Note]) -> Result<Self, CommandError> {
        check_song_number(number)?;
        if notes.len() < SONG_NOTES_MIN || notes.len() > SONG_NOTES_MAX {
            return Err(CommandError::SongLength(notes.len()));
        }

        let mut builder = PayloadBuilder::with_capacity(2 + notes.len() * 2)
            .u8(number)
            .u8(notes.len() as u8);
        for note in notes {
            builder = builder.u8(note.tone).u8(note.duration);
        }
        Ok(Self::simple(Opcode::Song, builder.build()))
    }

    /// "Play Song": play a slot programmed with [`Command::song`]
    pub fn play_song(number: u8) -> Result<Self, CommandError> {
        check_song_number(number)?;
        Ok(Self::simple(Opcode::PlaySong, vec![number]))
    }
}

fn check_velocity(field: &'static str, velocity: i16) -> Result<(), CommandError> {
    CommandError::check_range(field, velocity.into(), VELOCITY_MIN, VELOCITY_MAX)
}

fn check_song_number(number: u8) -> Result<(), CommandError> {
    CommandError::check_range("song number", number.into(), 0, SONG_NUMBER_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_bytes() {
        assert_eq!(Opcode::Start.byte(), 128);
        assert_eq!(Opcode::Drive.byte(), 137);
        assert_eq!(Opcode::SendIr.byte(), 151);
    }

    #[test]
    fn test_baud_command_is_tagged() {
        let cmd = Command::baud(19200).unwrap();
        assert_eq!(cmd.opcode(), Opcode::Baud);
        assert_eq!(cmd.baud_change(), Some(BaudRate::B19200));
        assert_eq!(Command::start().baud_change(), None);
    }

    #[test]
    fn test_no_responses_expected() {
        let cmd = Command::drive(100, 100).unwrap();
        assert!(!cmd.expects_response());
        assert_eq!(cmd.response_timeout(), ResponseTimeout::None);
    }

    #[test]
    fn test_demo_try_from() {
        assert_eq!(Demo::try_from(0), Ok(Demo::Cover));
        assert_eq!(Demo::try_from(9), Ok(Demo::Banjo));
        assert_eq!(Demo::try_from(10), Err(CommandError::InvalidDemo(10)));
        assert_eq!(Demo::try_from(109), Err(CommandError::InvalidDemo(109)));
    }

    #[test]
    fn test_note_rest() {
        assert!(Note::rest(32).is_rest());
        assert!(Note::new(30, 16).is_rest());
        assert!(!Note::new(31, 16).is_rest());
        assert!(!Note::new(127, 16).is_rest());
        assert!(Note::new(128, 16).is_rest());
    }

    #[test]
    fn test_leds_flag_bits() {
        assert_eq!(Command::leds(true, true, 0, 0).encode(), vec![139, 0x0A, 0, 0]);
        assert_eq!(Command::leds(false, false, 7, 9).encode(), vec![139, 0x00, 7, 9]);
    }

    #[test]
    fn test_pwm_wire_order() {
        let cmd = Command::pwm_low_side_drivers(1, 2, 3).unwrap();
        assert_eq!(cmd.encode(), vec![144, 3, 2, 1]);
    }
}
