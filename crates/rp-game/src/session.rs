//! One running installation
//!
//! `InstallationSession` owns the machine and everything that paces a round
//! around it. The host calls [`InstallationSession::tick`] once per frame
//! with the measured elapsed time and renders [`InstallationSession::frame`].

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rp_reel::{MachineController, ReelError, ReelResult, SpinSummary};

use crate::config::InstallationConfig;
use crate::error::{ConfigResult, DeviceResult};
use crate::io::{Clip, Collaborators, Frame, ReelView};
use crate::outcome::{GameOutcomeDecider, SpinPlan};
use crate::phase::GamePhase;
use crate::stage::{Stage, StageEvent};
use crate::timer::TimerQueue;

/// Delayed steps of a winning round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    ShowPrompt,
    HidePrompt,
    /// End of the cooldown after the prompt
    Ready,
}

/// Prompt pacing after a win
#[derive(Debug, Clone, PartialEq)]
struct PromptSettings {
    text: String,
    delay: f64,
    duration: f64,
    cooldown: f64,
}

/// Screen geometry handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
struct Geometry {
    width: f64,
    height: f64,
    neighbors: usize,
}

pub struct InstallationSession {
    machine: MachineController,
    decider: GameOutcomeDecider,
    timers: TimerQueue<TimerAction>,
    phase: GamePhase,
    /// Seconds since start
    clock: f64,
    rng: StdRng,
    devices: Collaborators,
    image_path: PathBuf,
    printer_address: Option<String>,
    prompt: PromptSettings,
    fade_out_ms: u32,
    geometry: Geometry,
    rounds: u64,
    wins: u64,
}

impl InstallationSession {
    /// Build from a configuration; the reels start on the resting word
    pub fn new(config: &InstallationConfig, devices: Collaborators) -> ConfigResult<Self> {
        config.validate()?;

        let game = &config.game;
        let mut machine = config.machine.build_machine(game.denylist.clone())?;
        let resting: Vec<char> = game.resting_word.chars().collect();
        machine.set_immediate(&resting)?;

        log::info!(
            "session ready: {} reels, threshold {}, resting on {}",
            machine.num_reels(),
            game.win_threshold,
            game.resting_word
        );

        Ok(Self {
            machine,
            decider: GameOutcomeDecider::from_config(game),
            timers: TimerQueue::new(),
            phase: GamePhase::Idle,
            clock: 0.0,
            rng: StdRng::from_os_rng(),
            devices,
            image_path: config.print.image_path.clone(),
            printer_address: config.print.printer_address.clone(),
            prompt: PromptSettings {
                text: game.prompt_text.clone(),
                delay: game.prompt_delay_seconds,
                duration: game.prompt_duration_seconds,
                cooldown: game.cooldown_seconds,
            },
            fade_out_ms: config.audio.fade_out_ms,
            geometry: Geometry {
                width: f64::from(config.display.width),
                height: f64::from(config.display.height),
                neighbors: config.display.visible_neighbors(),
            },
            rounds: 0,
            wins: 0,
        })
    }

    /// Make outcomes reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn machine(&self) -> &MachineController {
        &self.machine
    }

    pub fn decider(&self) -> &GameOutcomeDecider {
        &self.decider
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Rounds played and rounds won
    pub fn stats(&self) -> (u64, u64) {
        (self.rounds, self.wins)
    }

    /// Start a decided round.
    ///
    /// Rejected with [`ReelError::AlreadySpinning`] unless the session is idle.
    pub fn start_spin(&mut self, plan: SpinPlan) -> ReelResult<Vec<StageEvent>> {
        if !self.phase.accepts_spin() {
            return Err(ReelError::AlreadySpinning);
        }
        self.machine.spin_to(&plan.request)?;

        self.phase = GamePhase::Spinning { won: plan.won };
        self.rounds += 1;
        if plan.won {
            self.wins += 1;
        }

        let now = self.clock;
        let mut events = vec![StageEvent::new(Stage::SpinStart { won: plan.won }, now)];
        report("indicator", self.devices.indicator.set_indicator(true));
        report("spin clip", self.devices.audio.play(Clip::Spin));

        // The printer gets the whole spin as a head start
        if plan.won {
            if let Some(destination) = self.dispatch_print() {
                events.push(StageEvent::new(Stage::PrintQueued { destination }, now));
            }
        }
        Ok(events)
    }

    /// Advance the installation by `elapsed` seconds
    pub fn tick(&mut self, elapsed: f64) -> Vec<StageEvent> {
        let elapsed = if elapsed.is_finite() && elapsed > 0.0 { elapsed } else { 0.0 };
        self.clock += elapsed;
        let mut events = Vec::new();

        if self.devices.input.poll_button_pressed() {
            self.on_press(&mut events);
        }

        let motion = self.machine.tick(elapsed);
        for &reel_index in &motion.stopped {
            if let Some(reel) = self.machine.reel(reel_index) {
                events.push(StageEvent::new(
                    Stage::ReelStop {
                        reel_index,
                        symbol: reel.current_symbol(),
                    },
                    self.clock,
                ));
            }
        }
        if let Some(summary) = motion.completed {
            self.on_spin_complete(&summary, &mut events);
        }

        for action in self.timers.pop_due(self.clock) {
            self.on_timer(action, &mut events);
        }

        if log::log_enabled!(log::Level::Debug) {
            for event in &events {
                log::debug!("{}", event.to_json());
            }
        }
        events
    }

    /// Everything the renderer needs for the current state
    pub fn frame(&self, fps: Option<f64>) -> Frame<'_> {
        let total = self.machine.num_reels();
        let reels = self
            .machine
            .reels()
            .iter()
            .map(|reel| ReelView {
                column: reel.column(),
                rect: reel.layout(total, self.geometry.width, self.geometry.height),
                window: reel.window(self.geometry.neighbors),
            })
            .collect();

        Frame {
            reels,
            phase: self.phase,
            prompt: self.phase.prompt_visible().then_some(self.prompt.text.as_str()),
            fps,
        }
    }

    fn on_press(&mut self, events: &mut Vec<StageEvent>) {
        if !self.phase.accepts_spin() {
            log::warn!("button press ignored: machine is {}", self.phase.name());
            events.push(StageEvent::new(Stage::SpinRejected, self.clock));
            return;
        }

        let plan = self.decider.decide(&mut self.rng);
        match self.start_spin(plan) {
            Ok(started) => events.extend(started),
            Err(err) => {
                log::warn!("spin not started: {}", err);
                events.push(StageEvent::new(Stage::SpinRejected, self.clock));
            }
        }
    }

    fn on_spin_complete(&mut self, summary: &SpinSummary, events: &mut Vec<StageEvent>) {
        let won = matches!(self.phase, GamePhase::Spinning { won: true });
        let now = self.clock;

        report("indicator", self.devices.indicator.set_indicator(false));
        report("spin clip", self.devices.audio.fade_out(Clip::Spin, self.fade_out_ms));
        events.push(StageEvent::new(
            Stage::SpinEnd {
                won,
                symbols: summary.symbols.iter().collect(),
            },
            now,
        ));

        if won {
            report("win clip", self.devices.audio.play(Clip::Win));
            self.phase = GamePhase::Resolving { won: true };
            self.timers.schedule_in(now, self.prompt.delay, TimerAction::ShowPrompt);
        } else {
            self.phase = GamePhase::Idle;
            events.push(StageEvent::new(Stage::Idle, now));
        }
    }

    fn on_timer(&mut self, action: TimerAction, events: &mut Vec<StageEvent>) {
        let now = self.clock;
        match action {
            TimerAction::ShowPrompt => {
                self.phase = GamePhase::Presenting { prompt_visible: true };
                events.push(StageEvent::new(Stage::PromptShow, now));
                self.timers.schedule_in(now, self.prompt.duration, TimerAction::HidePrompt);
            }
            TimerAction::HidePrompt => {
                self.phase = GamePhase::Presenting { prompt_visible: false };
                events.push(StageEvent::new(Stage::PromptHide, now));
                self.timers.schedule_in(now, self.prompt.cooldown, TimerAction::Ready);
            }
            TimerAction::Ready => {
                self.phase = GamePhase::Idle;
                events.push(StageEvent::new(Stage::Idle, now));
            }
        }
    }

    fn dispatch_print(&mut self) -> Option<String> {
        let Some(destination) = self.printer_address.clone() else {
            log::info!("no printer configured, skipping print");
            return None;
        };
        match self.devices.printer.print_image(&self.image_path, &destination) {
            Ok(()) => {
                log::info!("print of {} sent to {}", self.image_path.display(), destination);
                Some(destination)
            }
            Err(err) => {
                log::warn!("print to {} failed: {}", destination, err);
                None
            }
        }
    }
}

fn report(device: &str, result: DeviceResult<()>) {
    if let Err(err) = result {
        log::warn!("{} failed: {}", device, err);
    }
}

impl std::fmt::Debug for InstallationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationSession")
            .field("phase", &self.phase)
            .field("clock", &self.clock)
            .field("machine", &self.machine)
            .field("pending_timers", &self.timers.len())
            .field("rounds", &self.rounds)
            .field("wins", &self.wins)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> InstallationSession {
        InstallationSession::new(&InstallationConfig::default(), Collaborators::absent())
            .unwrap()
            .with_seed(1)
    }

    fn run_until_idle(session: &mut InstallationSession) -> Vec<StageEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            events.extend(session.tick(1.0 / 120.0 * 12.0));
            if session.phase() == GamePhase::Idle {
                break;
            }
        }
        events
    }

    #[test]
    fn test_starts_on_resting_word() {
        let session = session();
        assert_eq!(session.machine().displayed_symbols(), vec!['#', 'M', 'A', 'G', 'A']);
        assert_eq!(session.phase(), GamePhase::Idle);
        assert!(session.frame(None).prompt.is_none());
    }

    #[test]
    fn test_winning_round_walks_every_phase() {
        let mut session = session();
        let plan = session.decider().decide_with(0.0, 0.5);
        let started = session.start_spin(plan).unwrap();
        assert_eq!(started[0].stage, Stage::SpinStart { won: true });
        assert_eq!(session.phase(), GamePhase::Spinning { won: true });

        let events = run_until_idle(&mut session);
        let names: Vec<_> = events
            .iter()
            .map(StageEvent::type_name)
            .filter(|name| *name != "reel_stop")
            .collect();
        assert_eq!(names, vec!["spin_end", "prompt_show", "prompt_hide", "idle"]);
        assert_eq!(session.machine().displayed_symbols(), vec!['#', 'M', 'A', 'G', 'A']);
        assert_eq!(session.stats(), (1, 1));
    }

    #[test]
    fn test_losing_round_goes_idle_on_completion() {
        let mut session = session();
        let plan = session.decider().decide_with(0.99, 0.0);
        session.start_spin(plan).unwrap();

        let events = run_until_idle(&mut session);
        let end = events
            .iter()
            .position(|e| e.type_name() == "spin_end")
            .unwrap();
        assert_eq!(events[end + 1].stage, Stage::Idle);
        assert_eq!(events[end].timestamp_s, events[end + 1].timestamp_s);
        assert_eq!(session.machine().displayed_symbols()[3], 'A');
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn test_start_spin_rejected_while_busy() {
        let mut session = session();
        let plan = session.decider().decide_with(0.99, 0.3);
        session.start_spin(plan.clone()).unwrap();
        let targets = session.machine().targets().to_vec();

        assert_eq!(session.start_spin(plan), Err(ReelError::AlreadySpinning));
        assert_eq!(session.machine().targets(), targets.as_slice());
    }

    #[test]
    fn test_prompt_visible_in_frame() {
        let mut session = session();
        let plan = session.decider().decide_with(0.0, 0.5);
        session.start_spin(plan).unwrap();
        for _ in 0..10_000 {
            session.tick(0.05);
            if session.phase().prompt_visible() {
                break;
            }
        }
        let frame = session.frame(Some(120.0));
        assert_eq!(frame.prompt, Some("You won! Take your print."));
        assert_eq!(frame.reels.len(), 5);
        assert_eq!(frame.reels[2].window.len(), 3);
        assert_eq!(frame.fps, Some(120.0));
    }
}
