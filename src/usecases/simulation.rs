//! Simulation - Tick Loop and Run Lifecycle
//!
//! Owns the market, both books and the evidence source, and advances
//! them one tick at a time:
//! 1. On a learning-cycle tick: price learning, remember the current
//!    price, then one evidence event while the budget lasts
//! 2. Agents act in a freshly shuffled order; each submits its FOR
//!    quote, then its AGAINST quote, then the books are cleared
//! 3. A [`TickSnapshot`] is emitted
//!
//! A seeded run is fully deterministic: every random draw (initial
//! beliefs, agent order, signals, audiences) comes from one `StdRng`.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::loader::validate_config;
use crate::config::{BeliefInit, SimConfig};
use crate::domain::agent::{Agent, QuotePolicy};
use crate::domain::error::SimError;
use crate::domain::evidence::{EvidenceSource, Signal};
use crate::domain::market::Market;
use crate::domain::order::{AgentId, Order, SequenceCounter, Side};
use crate::domain::order_book::OrderBooks;
use crate::domain::phase::Phase;
use crate::ports::observer::{TickObserver, TickSnapshot};
use crate::ports::repository::RunSummary;
use crate::usecases::learning::{
  LearningSchedule, audience_size, distribute_evidence, learn_from_market,
};
use crate::usecases::matching_engine::MatchingEngine;

/// A single market run.
pub struct Simulation {
  run_id: Uuid,
  started_at: chrono::DateTime<Utc>,
  config: SimConfig,
  market: Market,
  books: OrderBooks,
  engine: MatchingEngine,
  source: EvidenceSource,
  schedule: LearningSchedule,
  policy: QuotePolicy,
  counter: SequenceCounter,
  rng: StdRng,
  audience: usize,
  tick: u64,
  phase: Phase,
}

impl Simulation {
  /// Build a run from a configuration.
  ///
  /// # Errors
  /// Fails if the configuration does not validate.
  pub fn new(config: SimConfig) -> Result<Self> {
    validate_config(&config).context("Invalid simulation configuration")?;

    let mut rng = match config.simulation.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };

    let wealth = config.initial_wealth()?;
    let agents = (0..config.agents.num_agents)
      .map(|i| {
        let belief = match config.agents.belief {
          BeliefInit::Fixed { value } => value,
          BeliefInit::Uniform { low, high } => rng.gen_range(low..high),
        };
        Agent::new(
          AgentId(i),
          belief,
          config.agents.risk_factor,
          config.agents.trust,
          wealth,
        )
      })
      .collect();
    let mut market = Market::new(agents);
    if let Some(price) = config.initial_market_price()? {
      market = market.with_market_price(price);
    }

    let source = EvidenceSource::new(config.evidence_params())?;
    let schedule = LearningSchedule::new(
      config.simulation.num_iterations,
      config.simulation.extra_time_fraction,
      config.evidence.num_evidence_events,
      config.simulation.learning_interval,
    );
    let policy = config.quote_policy()?;
    let audience = audience_size(
      config.agents.num_agents,
      config.evidence.fraction_receiving_evidence,
    );
    let books = OrderBooks::new(config.quoting.against_ranking);

    let phase = Phase::at(
      0,
      schedule.evidence_end(),
      config.simulation.num_iterations,
      market.market_price().is_some(),
    );

    Ok(Self {
      run_id: Uuid::new_v4(),
      started_at: Utc::now(),
      config,
      market,
      books,
      engine: MatchingEngine::new(),
      source,
      schedule,
      policy,
      counter: SequenceCounter::new(),
      rng,
      audience,
      tick: 0,
      phase,
    })
  }

  pub fn run_id(&self) -> Uuid {
    self.run_id
  }

  pub fn market(&self) -> &Market {
    &self.market
  }

  pub fn books(&self) -> &OrderBooks {
    &self.books
  }

  pub fn source(&self) -> &EvidenceSource {
    &self.source
  }

  pub fn schedule(&self) -> &LearningSchedule {
    &self.schedule
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Ticks executed so far.
  pub fn ticks_run(&self) -> u64 {
    self.tick
  }

  pub fn is_finished(&self) -> bool {
    self.tick >= self.config.simulation.num_iterations
  }

  /// Run every remaining tick, feeding each snapshot to `observer`.
  ///
  /// # Errors
  /// Aborts on the first degenerate probability or price.
  pub fn run<O: TickObserver + ?Sized>(&mut self, observer: &mut O) -> Result<RunSummary, SimError> {
    info!(
      run_id = %self.run_id,
      agents = self.market.len(),
      iterations = self.config.simulation.num_iterations,
      evidence_end = self.schedule.evidence_end(),
      interval = ?self.schedule.interval(),
      audience = self.audience,
      "Simulation started"
    );

    while !self.is_finished() {
      let snapshot = self.step()?;
      observer.on_tick(&snapshot);
    }
    self.enter_phase(Phase::Terminal);

    let summary = self.summary();
    info!(
      run_id = %summary.run_id,
      ticks = summary.ticks,
      trades = summary.total_trades,
      discarded = summary.total_discarded,
      final_price = ?summary.final_market_price,
      true_belief = summary.true_belief,
      "Simulation finished"
    );
    Ok(summary)
  }

  /// Execute one tick.
  ///
  /// Calling it after the last tick is a no-op that reports the final state.
  pub fn step(&mut self) -> Result<TickSnapshot, SimError> {
    if self.is_finished() {
      self.enter_phase(Phase::Terminal);
      return Ok(self.snapshot(0, 0, None));
    }

    let tick = self.tick;
    self.enter_phase(self.phase_at(tick));

    let mut evidence = None;
    if self.schedule.is_cycle(tick) {
      learn_from_market(&mut self.market)?;
      self.market.snapshot_previous_price();
      if self.source.events_fired() < self.schedule.max_events() {
        let event = distribute_evidence(
          &mut self.source,
          &mut self.market,
          self.audience,
          &mut self.rng,
        )?;
        evidence = Some(event.signal);
      }
    }

    let mut order: Vec<usize> = (0..self.market.len()).collect();
    order.shuffle(&mut self.rng);

    let (mut trades, mut discarded) = (0, 0);
    for idx in order {
      let id = AgentId(idx);
      self.submit(id, Side::For)?;
      self.submit(id, Side::Against)?;
      let report = self.engine.clear(&mut self.books, &mut self.market)?;
      trades += report.fills.len();
      discarded += report.discarded.len();
      if !report.fills.is_empty() {
        // First trade of the run ends the warmup.
        self.enter_phase(self.phase_at(tick));
      }
    }

    self.tick += 1;
    let snapshot = self.snapshot(trades, discarded, evidence);
    debug!(
      tick,
      trades,
      discarded,
      price = ?snapshot.market_price,
      depth_for = snapshot.depth_for,
      depth_against = snapshot.depth_against,
      "Tick complete"
    );
    Ok(snapshot)
  }

  /// Summary of the run so far.
  pub fn summary(&self) -> RunSummary {
    RunSummary {
      run_id: self.run_id,
      name: self.config.simulation.name.clone(),
      started_at: self.started_at,
      seed: self.config.simulation.seed,
      ticks: self.tick,
      final_market_price: self.market.market_price(),
      true_belief: self.source.true_belief(),
      evidence_events: self.source.events_fired(),
      orders_submitted: self.counter.issued(),
      total_trades: self.engine.total_fills(),
      total_discarded: self.engine.total_discarded(),
      agents: self.market.snapshots(),
    }
  }

  /// Quote one side for `id` and rest it as unit orders.
  fn submit(&mut self, id: AgentId, side: Side) -> Result<(), SimError> {
    let quote = self.market.agent(id)?.quote(
      side,
      &self.books,
      self.market.market_price(),
      &self.policy,
    );
    let Some(quote) = quote else {
      return Ok(());
    };

    for _ in 0..quote.quantity {
      let sequence = self.counter.next();
      self
        .books
        .insert(Order::new(side, quote.price, sequence, id));
    }
    debug!(
      agent = %id,
      %side,
      price = %quote.price,
      quantity = quote.quantity,
      "Quote submitted"
    );
    Ok(())
  }

  fn phase_at(&self, tick: u64) -> Phase {
    Phase::at(
      tick,
      self.schedule.evidence_end(),
      self.config.simulation.num_iterations,
      self.market.market_price().is_some(),
    )
  }

  fn enter_phase(&mut self, phase: Phase) {
    if phase != self.phase {
      info!(from = %self.phase, to = %phase, tick = self.tick, "Phase transition");
      self.phase = phase;
    }
  }

  fn snapshot(
    &self,
    trades: usize,
    discarded: usize,
    evidence: Option<Signal>,
  ) -> TickSnapshot {
    let (depth_for, depth_against) = self.books.depths();
    TickSnapshot {
      tick: self.tick.saturating_sub(1),
      phase: self.phase,
      market_price: self.market.market_price(),
      true_belief: self.source.true_belief(),
      average_belief: self.market.average_belief().unwrap_or(0.0),
      trades,
      discarded,
      depth_for,
      depth_against,
      evidence,
    }
  }
}
