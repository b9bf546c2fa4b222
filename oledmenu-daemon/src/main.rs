//! oledmenu daemon
//!
//! Opens the panel and buttons, builds the menu and runs it until a
//! terminal scene is reached, then carries out that scene's action.

use std::process::ExitCode;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use log::{error, info};
use oledmenu_core::{ButtonPad, Controller, Terminal};
use oledmenu_display::{Panel, Ssd1306};
use oledmenu_hal_linux::{LinuxI2c, SysfsButton, SystemClock};

use oledmenu_daemon::config::{CliArgs, DaemonConfig};
use oledmenu_daemon::error::DaemonError;
use oledmenu_daemon::metrics::SystemMetrics;
use oledmenu_daemon::network::{Nmcli, NmcliTimeouts};
use oledmenu_daemon::scenes::{self, KeyboardFactory, Services};
use oledmenu_daemon::shell::{Runner, SystemRunner};
use oledmenu_daemon::text_input::{KeyEventSource, TerminalKeySource};

/// Upper bound for `shutdown` / `reboot` to return
const POWER_ACTION_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    info!("Starting oledmenu {}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), DaemonError> {
    let config = DaemonConfig::load(args.config.as_deref())?;

    let keyboard: KeyboardFactory = Rc::new(|| {
        TerminalKeySource::open().map(|source| Box::new(source) as Box<dyn KeyEventSource>)
    });
    let services = Services {
        status: Rc::new(SystemMetrics::new(SystemRunner)),
        network: Rc::new(Nmcli::new(SystemRunner, NmcliTimeouts::from(&config.network))),
        keyboard,
        seed: seed(),
    };
    let (navigator, menu) = scenes::build(services)?;

    let i2c = LinuxI2c::open(&config.display.i2c_bus)?;
    let panel = Panel::new(Ssd1306::with_config(i2c, config.i2c()), config.geometry());
    let pins = config
        .buttons
        .pins
        .iter()
        .map(|&pin| SysfsButton::open(pin))
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        "panel on {} at 0x{:02x}, buttons on GPIO {:?}",
        config.display.i2c_bus, config.display.address, config.buttons.pins
    );

    let mut controller = Controller::new(
        navigator,
        panel,
        ButtonPad::new(pins),
        SystemClock::new(),
        config.loop_timing(),
    );
    let terminal = controller.run(menu.splash)?;
    power_action(terminal, &SystemRunner)
}

/// Carry out what the final scene asks for
fn power_action(terminal: Terminal, runner: &dyn Runner) -> Result<(), DaemonError> {
    let (action, args): (&'static str, &[&str]) = match terminal {
        Terminal::Exit => {
            info!("Exit requested");
            return Ok(());
        }
        Terminal::Shutdown => ("shutdown", &["now"]),
        Terminal::Reboot => ("reboot", &[]),
    };
    info!("Running {}", action);
    let status = runner.run(action, args, POWER_ACTION_TIMEOUT);
    if status.success() {
        Ok(())
    } else {
        Err(DaemonError::Terminal {
            action,
            code: status.code,
            message: status.message,
        })
    }
}

/// Splash noise seed; any non-constant value will do
fn seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() | 1)
        .unwrap_or(1)
}
