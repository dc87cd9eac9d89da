use crate::extractor;

/// Header names that hold phone numbers, most specific first. Compared after
/// lower-casing and dropping everything that is not a letter or digit, so
/// `Phone Number`, `phone_number` and `phoneNumber` are all `phonenumber`.
const PHONE_HEADERS: [&str; 9] = [
    "phone",
    "phonenumber",
    "telephone",
    "tel",
    "mobile",
    "cell",
    "cellphone",
    "number",
    "msisdn",
];

/// Which columns of a tabular source carry the phone number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneColumns {
    /// Column indices in priority order. Empty when no header matched.
    indices: Vec<usize>,
}

impl PhoneColumns {
    pub fn detect<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized = headers.into_iter().map(normalize_header).collect::<Vec<_>>();

        let mut indices = Vec::new();
        for name in PHONE_HEADERS {
            indices.extend(
                normalized
                    .iter()
                    .enumerate()
                    .filter(|(_, header)| header.as_str() == name)
                    .map(|(index, _)| index),
            );
        }
        // "Work Phone", "Phone (mobile)" and friends.
        for (index, header) in normalized.iter().enumerate() {
            if header.contains("phone") && !indices.contains(&index) {
                indices.push(index);
            }
        }
        Self { indices }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// A header row that matched no phone header but whose first cell holds
    /// a number is really the first data row.
    pub fn is_headerless(&self, first_cell: &str) -> bool {
        self.is_empty() && !extractor::extract(first_cell).is_empty()
    }

    /// Picks the first detected column that has a value in this row, falling
    /// back to the first column of the row.
    pub fn choose<F>(&self, has_value: F) -> usize
    where
        F: Fn(usize) -> bool,
    {
        self.indices
            .iter()
            .copied()
            .find(|&index| has_value(index))
            .unwrap_or(0)
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::PhoneColumns;

    #[test]
    fn prefers_specific_headers() {
        let columns = PhoneColumns::detect(["Name", "Number", "Phone Number", "phone"]);
        assert_eq!(columns.choose(|_| true), 3);
        // phone is blank in this row, so phoneNumber wins
        assert_eq!(columns.choose(|index| index != 3), 2);
        assert_eq!(columns.choose(|index| index == 1), 1);
    }

    #[test]
    fn falls_back_to_first_column() {
        let columns = PhoneColumns::detect(["id", "name"]);
        assert!(columns.is_empty());
        assert_eq!(columns.choose(|_| true), 0);
    }

    #[test]
    fn number_in_first_cell_means_no_header() {
        let numbers = PhoneColumns::detect(["7737765277", "Ada"]);
        assert!(numbers.is_headerless("7737765277"));

        let names = PhoneColumns::detect(["id", "name"]);
        assert!(!names.is_headerless("id"));

        let phone = PhoneColumns::detect(["phone"]);
        assert!(!phone.is_headerless("+1 773 776 5277"));
    }

    #[test]
    fn loose_phone_headers_are_detected() {
        let columns = PhoneColumns::detect(["Name", "Work Phone"]);
        assert_eq!(columns.choose(|_| true), 1);
    }
}
