use super::{ScoredAgent, SelectionStrategy, StrategyError};

use carevo_nn::networks::Network;

use log::warn;
use rand::RngCore;

/// A selection decorator that keeps the best agent ever
/// seen from being lost.
///
/// On every call the current best agent is compared to the
/// best-ever record. If the generation improved on (or matched)
/// the record, the record is updated and selection proceeds
/// normally. If it regressed, the generation's worst agent is
/// replaced by the best-ever agent before delegating to the
/// wrapped strategy.
///
/// The record is only updated once the wrapped
/// strategy has returned successfully. It belongs to the
/// selection stage alone: if a later stage of the same
/// generation fails, the record keeps what selection saw.
#[derive(Clone, Debug)]
pub struct Elitism<S> {
    inner: S,
    best_ever: Option<ScoredAgent>,
}

impl<S> Elitism<S> {
    /// Wraps `inner` with an empty best-ever record.
    pub fn new(inner: S) -> Elitism<S> {
        Elitism {
            inner,
            best_ever: None,
        }
    }

    /// Returns the best agent seen so far, if any.
    pub fn best_ever(&self) -> Option<&ScoredAgent> {
        self.best_ever.as_ref()
    }

    /// Returns the wrapped strategy.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SelectionStrategy> SelectionStrategy for Elitism<S> {
    fn select(
        &mut self,
        agents: &[ScoredAgent],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        let (best, worst) = extremes(agents)?;
        let current_best = &agents[best];

        let regressed = matches!(
            &self.best_ever,
            Some(record) if current_best.fitness < record.fitness
        );
        if regressed {
            if let Some(record) = &self.best_ever {
                warn!(
                    "best fitness regressed from {} to {}, reinstating best-ever agent",
                    record.fitness, current_best.fitness
                );
                let mut reinstated = agents.to_vec();
                reinstated[worst] = record.clone();
                return self.inner.select(&reinstated, rng);
            }
        }

        let selected = self.inner.select(agents, rng)?;
        self.best_ever = Some(current_best.clone());
        Ok(selected)
    }
}

/// Indices of the best and worst agents. The
/// first of equally fit agents wins either way.
fn extremes(agents: &[ScoredAgent]) -> Result<(usize, usize), StrategyError> {
    if agents.is_empty() {
        return Err(StrategyError::NoAgents);
    }
    let (mut best, mut worst) = (0, 0);
    for (index, agent) in agents.iter().enumerate() {
        if agent.fitness.is_nan() {
            return Err(StrategyError::InvalidFitness {
                index,
                fitness: agent.fitness,
            });
        }
        if agent.fitness > agents[best].fitness {
            best = index;
        }
        if agent.fitness < agents[worst].fitness {
            worst = index;
        }
    }
    Ok((best, worst))
}
