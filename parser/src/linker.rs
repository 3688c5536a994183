use crate::model::{Information, Movement};

/// Привязывает информационные записи к движениям по `(sequence, reference_number)`.
///
/// Запись добавляется в каждое совпавшее движение, не только в первое.
/// Возвращает те записи, для которых движения не нашлось.
pub(crate) fn link(movements: &mut [Movement], information: Vec<Information>) -> Vec<Information> {
    information
        .into_iter()
        .filter_map(|info| {
            let mut matched = false;

            for movement in movements.iter_mut().filter(|m| {
                m.sequence == info.sequence && m.reference_number == info.reference_number
            }) {
                movement.information.push(info.clone());
                matched = true;
            }

            (!matched).then_some(info)
        })
        .collect()
}
