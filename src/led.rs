use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Receiver};
use esp_hal::gpio::Output;

use crate::command::Command;
use crate::constants::COMMAND_QUEUE_DEPTH;

static LED_ON: AtomicBool = AtomicBool::new(false);

/// Last commanded LED state, read by the status publisher.
pub fn is_on() -> bool {
    LED_ON.load(Ordering::Relaxed)
}

pub struct Led {
    output: Output<'static>,
}

impl Led {
    // Devkit LEDs are wired active-high; the pin starts low, LED off.
    pub fn new(output: Output<'static>) -> Self {
        Self { output }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::On => self.output.set_high(),
            Command::Off => self.output.set_low(),
        }
        LED_ON.store(command == Command::On, Ordering::Relaxed);
        log::info!("LED switched {:?}", command);
    }
}

#[embassy_executor::task]
pub async fn led_task(
    mut led: Led,
    commands: Receiver<'static, CriticalSectionRawMutex, Command, COMMAND_QUEUE_DEPTH>,
) {
    loop {
        let command = commands.receive().await;
        led.apply(command);
    }
}
