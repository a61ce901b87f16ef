//! # Mapa ordenado de headers
//! src/http/headers.rs
//!
//! Los headers se guardan en orden de inserción. Buscar, reemplazar y
//! borrar comparan el nombre sin distinguir mayúsculas; reemplazar un
//! header existente conserva su posición original (última escritura gana).

/// Colección ordenada de headers `nombre: valor`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta o sobrescribe un header
    ///
    /// Si ya existe uno con el mismo nombre se reemplaza el valor (y el
    /// nombre, para que quede la última forma escrita).
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Inserta el header solo si no existe todavía
    pub fn insert_if_absent(&mut self, name: &str, value: impl Into<String>) {
        if !self.contains(name) {
            self.entries.push((name.to_string(), value.into()));
        }
    }

    /// Obtiene el valor de un header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Elimina un header y retorna su valor
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Itera los headers en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("X-Custom", "1");
        headers.insert("Accept", "*/*");

        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Content-Type", "X-Custom", "Accept"]);
    }

    #[test]
    fn test_overwrite_is_case_insensitive_and_keeps_position() {
        let mut headers = Headers::new();
        headers.insert("Content-Length", "10");
        headers.insert("Server", "a");
        headers.insert("content-length", "3");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("CONTENT-LENGTH"), Some("3"));
        assert_eq!(headers.iter().next(), Some(("content-length", "3")));
    }

    #[test]
    fn test_insert_if_absent() {
        let mut headers = Headers::new();
        headers.insert("server", "custom");
        headers.insert_if_absent("Server", "default");
        headers.insert_if_absent("Date", "now");

        assert_eq!(headers.get("Server"), Some("custom"));
        assert_eq!(headers.get("date"), Some("now"));
    }

    #[test]
    fn test_remove() {
        let mut headers = Headers::new();
        headers.insert("A", "1");
        assert_eq!(headers.remove("a"), Some("1".to_string()));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("a"), None);
    }
}
