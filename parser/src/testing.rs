//! Хелперы для тестов: сборка строк фиксированной ширины.

/// Ширина строки CODA
pub(crate) const WIDTH: usize = 128;

/// Строка из 128 пробелов, в которую по колонкам (0-based) вписаны поля
pub(crate) fn line(fields: &[(usize, &str)]) -> String {
    let mut columns = vec![' '; WIDTH];
    for (start, text) in fields {
        for (offset, ch) in text.chars().enumerate() {
            columns[start + offset] = ch;
        }
    }
    columns.into_iter().collect()
}

#[test]
fn line_places_fields_at_columns() {
    let l = line(&[(0, "21"), (125, "1"), (127, "0")]);

    assert_eq!(l.chars().count(), WIDTH);
    assert!(l.starts_with("21 "));
    assert!(l.ends_with("1 0"));
}
