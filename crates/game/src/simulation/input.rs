use rkyv::{Archive, Deserialize, Serialize};

/// Control snapshot sampled once per client frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct InputState {
    pub desired_right_amount: f32,
    pub desired_left_amount: f32,
    pub desired_forward_amount: f32,
    pub desired_back_amount: f32,
    pub is_shooting: bool,
    pub is_hyper_shooting: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_turn(mut self, amount: f32) -> Self {
        if amount >= 0.0 {
            self.desired_right_amount = amount.min(1.0);
        } else {
            self.desired_left_amount = (-amount).min(1.0);
        }
        self
    }

    pub fn with_thrust(mut self, amount: f32) -> Self {
        if amount >= 0.0 {
            self.desired_forward_amount = amount.min(1.0);
        } else {
            self.desired_back_amount = (-amount).min(1.0);
        }
        self
    }

    pub fn with_shooting(mut self, shooting: bool) -> Self {
        self.is_shooting = shooting;
        self
    }

    pub fn with_hyper_shooting(mut self, shooting: bool) -> Self {
        self.is_hyper_shooting = shooting;
        self
    }

    #[inline]
    pub fn horizontal_delta(&self) -> f32 {
        self.desired_right_amount - self.desired_left_amount
    }

    #[inline]
    pub fn vertical_delta(&self) -> f32 {
        self.desired_forward_amount - self.desired_back_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_combine_opposing_axes() {
        let input = InputState {
            desired_right_amount: 1.0,
            desired_left_amount: 0.25,
            desired_forward_amount: 0.0,
            desired_back_amount: 0.5,
            ..Default::default()
        };

        assert!((input.horizontal_delta() - 0.75).abs() < f32::EPSILON);
        assert!((input.vertical_delta() + 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn builders_clamp_to_unit_range() {
        let input = InputState::new().with_turn(-3.0).with_thrust(2.0);

        assert_eq!(input.desired_left_amount, 1.0);
        assert_eq!(input.desired_forward_amount, 1.0);
        assert_eq!(input.horizontal_delta(), -1.0);
    }
}
