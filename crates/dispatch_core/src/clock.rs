use bevy_ecs::prelude::Resource;

/// Discrete simulation time, advanced by one unit per tick.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advances time by one unit and returns the new value.
    pub fn advance(&mut self) -> u64 {
        self.now += 1;
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_one_unit_per_call() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.now(), 2);
    }
}
