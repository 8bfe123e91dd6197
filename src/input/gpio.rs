// src/input/gpio.rs  —  Raspberry Pi GPIO buttons via rppal
//
// Each button sits between a BCM pin and a supply rail; the internal pull
// resistor holds the other level when the button is open.  Which level
// counts as "pressed" is configurable (`active_high`), so both wiring styles
// work without code changes:
//
//   pull = "up",   active_high = false  →  button to GND, pressed reads LOW
//   pull = "down", active_high = true   →  button to 3V3, pressed reads HIGH
//
// The shipped default (pull up + active high) matches the glove prototype,
// whose switches are normally-closed to GND.
//
// ── Permissions ───────────────────────────────────────────────────────────────
// rppal maps /dev/gpiomem.  Add the service user to the `gpio` group:
//
//   sudo usermod -aG gpio $USER   # re-login needed
//
// ── Release ───────────────────────────────────────────────────────────────────
// rppal resets every pin to its previous mode and pull when the InputPin is
// dropped, so releasing the inputs is simply dropping `GpioInput`.

use anyhow::{Context, Result};
use rppal::gpio::{Gpio, InputPin};
use crate::config::{PinMap, Pull};
use super::{Finger, PinInput, PollSnapshot};

pub struct GpioInput {
    thumb:       InputPin,
    fingers:     [InputPin; 4],
    active_high: bool,
}

impl GpioInput {
    pub fn open(pins: &PinMap, pull: Pull, active_high: bool) -> Result<Self> {
        let gpio = Gpio::new()
            .context("Opening GPIO — is this a Raspberry Pi and is the user in the `gpio` group?")?;

        let open = |bcm: u8, what: &str| -> Result<InputPin> {
            let pin = gpio.get(bcm)
                .with_context(|| format!("Acquiring BCM {bcm} ({what})"))?;
            let mut input = match pull {
                Pull::Up   => pin.into_input_pullup(),
                Pull::Down => pin.into_input_pulldown(),
                Pull::None => pin.into_input(),
            };
            input.set_reset_on_drop(true);
            Ok(input)
        };

        let thumb = open(pins.thumb, "thumb")?;
        // Order must follow Finger::index()
        let fingers = [
            open(pins.finger(Finger::Pinky),   "pinky")?,
            open(pins.finger(Finger::Index),   "index")?,
            open(pins.finger(Finger::Middle),  "middle")?,
            open(pins.finger(Finger::Pointer), "pointer")?,
        ];

        log::info!(
            "[input] GPIO opened  thumb=BCM{}  pinky=BCM{}  index=BCM{}  middle=BCM{}  pointer=BCM{}  \
             pull={pull:?}  active_high={active_high}",
            pins.thumb, pins.pinky, pins.index, pins.middle, pins.pointer
        );

        Ok(Self { thumb, fingers, active_high })
    }

    fn pressed(&self, pin: &InputPin) -> bool {
        pin.is_high() == self.active_high
    }
}

impl PinInput for GpioInput {
    fn name(&self) -> &str { "Raspberry Pi GPIO" }

    fn read(&mut self) -> Result<PollSnapshot> {
        let thumb = self.pressed(&self.thumb);
        let mut fingers = [false; 4];
        for (level, pin) in fingers.iter_mut().zip(&self.fingers) {
            *level = self.pressed(pin);
        }
        Ok(PollSnapshot { thumb, fingers })
    }

    fn read_thumb(&mut self) -> Result<bool> {
        Ok(self.pressed(&self.thumb))
    }
}

impl Drop for GpioInput {
    fn drop(&mut self) {
        log::debug!("[input] releasing GPIO pins");
    }
}
