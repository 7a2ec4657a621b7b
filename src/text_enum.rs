//! A macro for closed enumerations that are stored and sent as fixed strings,
//! e.g. expense categories and statuses.

/// Define an enum whose variants map one-to-one to string constants.
///
/// The generated type can be parsed from and displayed as its string form,
/// serialized as a JSON string and stored in a SQLite `TEXT` column.
/// Parsing an unknown string fails with [crate::Error::Validation], naming
/// `$label` in the message.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $label:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The string stored in the database and sent to clients.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::Error::Validation(format!(
                        "unknown {} \"{other}\"",
                        $label
                    ))),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let text = <String as serde::Deserialize<'de>>::deserialize(deserializer)?;

                text.parse().map_err(serde::de::Error::custom)
            }
        }

        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error: crate::Error| {
                        rusqlite::types::FromSqlError::Other(Box::new(error))
                    })
            }
        }
    };
}

pub(crate) use text_enum;

#[cfg(test)]
mod text_enum_tests {
    use rusqlite::Connection;

    use crate::Error;

    super::text_enum! {
        /// A test enum.
        enum Colour: "colour" {
            Red => "VERMELHO",
            Blue => "AZUL",
        }
    }

    #[test]
    fn parses_known_strings() {
        assert_eq!("AZUL".parse::<Colour>(), Ok(Colour::Blue));
        assert_eq!(Colour::Red.to_string(), "VERMELHO");
        assert_eq!(Colour::ALL, &[Colour::Red, Colour::Blue]);
    }

    #[test]
    fn rejects_unknown_strings() {
        assert_eq!(
            "VERDE".parse::<Colour>(),
            Err(Error::Validation("unknown colour \"VERDE\"".to_owned()))
        );
    }

    #[test]
    fn serializes_as_json_string() {
        assert_eq!(serde_json::to_string(&Colour::Blue).unwrap(), r#""AZUL""#);
        assert_eq!(
            serde_json::from_str::<Colour>(r#""VERMELHO""#).unwrap(),
            Colour::Red
        );
        assert!(serde_json::from_str::<Colour>(r#""red""#).is_err());
    }

    #[test]
    fn round_trips_through_sqlite() {
        let connection = Connection::open_in_memory().unwrap();

        let colour: Colour = connection
            .query_row("SELECT ?1", [Colour::Blue], |row| row.get(0))
            .unwrap();

        assert_eq!(colour, Colour::Blue);
    }
}
