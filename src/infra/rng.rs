use crate::engine::RandomSource;

/// Шаг внутреннего счётчика (нечётный, чтобы обойти все 2^32 состояния).
const STATE_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^-32: масштаб из u32 в [0, 1).
const U32_SCALE: f64 = 1.0 / 4_294_967_296.0;

/// Детерминированный RNG для симуляции и реплея.
///
/// 32-битный счётчик + xor/shift/multiply перемешивание (mulberry32).
/// Вся арифметика 32-битная с переполнением, поэтому последовательность
/// одинакова на любой платформе. Глобального состояния нет.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterministicRng {
    state: u32,
}

impl DeterministicRng {
    /// Seed уже должен быть приведён к 32 битам (см. `RngSeed`).
    /// Нулевое состояние заменяется на 1.
    pub fn from_seed(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Следующее перемешанное 32-битное значение.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STATE_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61)) ^ t;
        t ^ (t >> 14)
    }

    /// Число в [0, 1).
    pub fn next(&mut self) -> f64 {
        self.next_u32() as f64 * U32_SCALE
    }
}

impl RandomSource for DeterministicRng {
    fn next_f64(&mut self) -> f64 {
        self.next()
    }
}

// Чтобы DeterministicRng можно было отдать в любые API из `rand`.
impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        DeterministicRng::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = DeterministicRng::next_u32(self) as u64;
        let lo = DeterministicRng::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = DeterministicRng::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Недетерминированный источник поверх `rand::thread_rng`.
/// Нужен хосту, когда seed не задан.
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl SystemRng {
    /// Свежий seed для нового забега.
    pub fn fresh_seed(&mut self) -> u64 {
        use rand::Rng;
        rand::thread_rng().gen::<u32>() as u64
    }
}

impl RandomSource for SystemRng {
    fn next_f64(&mut self) -> f64 {
        use rand::Rng;
        rand::thread_rng().gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seed_is_not_degenerate() {
        let mut zero = DeterministicRng::from_seed(0);
        let mut one = DeterministicRng::from_seed(1);
        assert_eq!(zero.next_u32(), one.next_u32());
    }

    #[test]
    fn rng_core_next_u64_consumes_two_words() {
        use rand::RngCore;

        let mut a = DeterministicRng::from_seed(7);
        let mut b = DeterministicRng::from_seed(7);
        let wide = RngCore::next_u64(&mut a);
        let hi = b.next_u32() as u64;
        let lo = b.next_u32() as u64;
        assert_eq!(wide, (hi << 32) | lo);
    }
}
