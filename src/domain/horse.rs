use serde::{Deserialize, Serialize};

use crate::domain::HorseId;

/// Лошадь в забеге.
///
/// Движок смотрит только на `id` и `rating`; имя и цвет нужны хосту для отображения.
/// После старта забега лошадь не меняется.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Horse {
    /// Номер лошади: 1..N, уникален в пределах забега.
    pub id: HorseId,
    pub name: String,
    /// Рейтинг, номинально 60–100. Чем выше, тем сильнее.
    pub rating: f64,
    /// Цвет для UI, движку не интересен.
    pub color: String,
}

impl Horse {
    pub fn new(id: HorseId, name: impl Into<String>, rating: f64, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rating,
            color: color.into(),
        }
    }
}

/// Сколько призовых мест засчитывается для ставки place:
/// 3 при восьми и более лошадях, иначе 2.
pub fn place_slots(horse_count: usize) -> usize {
    if horse_count >= 8 {
        3
    } else {
        2
    }
}
