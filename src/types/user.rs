use serde::{Deserialize, Deserializer, Serialize};

/// A person in the directory.
///
/// Remote records carry the extended fields (`username`, `website`,
/// `address`); locally created records only have the core four.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "deserialize_company")]
    pub company: Option<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl User {
    pub fn company_name(&self) -> Option<&str> {
        self.company
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Up to two uppercased initials taken from the words of the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    /// Case-insensitive substring match on name or email.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.email.to_lowercase().contains(&query)
    }
}

impl AsRef<User> for User {
    fn as_ref(&self) -> &User {
        self
    }
}

/// A user as submitted by the creation flow, before an id is assigned.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

impl NewUser {
    pub fn with_id(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: Some(Company::named(self.company)),
            username: None,
            website: None,
            address: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Company {
    pub name: String,
    #[serde(
        rename = "catchPhrase",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub catch_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

impl Company {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catch_phrase: None,
            bs: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
}

/// The upstream API and older local records disagree on the shape of
/// `company`: sometimes a bare string, sometimes an object. Both collapse
/// into `Company` here so nothing downstream has to branch on it.
fn deserialize_company<'de, D>(deserializer: D) -> Result<Option<Company>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCompany {
        Name(String),
        Full(Company),
    }

    Ok(
        Option::<RawCompany>::deserialize(deserializer)?.map(|raw| match raw {
            RawCompany::Name(name) => Company::named(name),
            RawCompany::Full(company) => company,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_as_string() {
        let user: User = serde_json::from_value(json!({
            "id": 11,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-123-4567",
            "company": "Analytical Engines"
        }))
        .unwrap();

        assert_eq!(user.company_name(), Some("Analytical Engines"));
        assert_eq!(user.company.unwrap().catch_phrase, None);
    }

    #[test]
    fn test_company_as_object() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        }))
        .unwrap();

        let company = user.company.as_ref().unwrap();
        assert_eq!(company.name, "Romaguera-Crona");
        assert_eq!(
            company.catch_phrase.as_deref(),
            Some("Multi-layered client-server neural-net")
        );
        assert_eq!(user.username.as_deref(), Some("Bret"));
        assert_eq!(user.address.as_ref().unwrap().city, "Gwenborough");
    }

    #[test]
    fn test_missing_company() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "name": "No Company",
            "email": "none@example.com"
        }))
        .unwrap();

        assert_eq!(user.company, None);
        assert_eq!(user.company_name(), None);
        assert_eq!(user.phone, "");
    }

    #[test]
    fn test_initials() {
        let mut user = NewUser {
            name: "leanne graham smith".to_string(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
        }
        .with_id(1);
        assert_eq!(user.initials(), "LG");

        user.name = "Cher".to_string();
        assert_eq!(user.initials(), "C");
    }

    #[test]
    fn test_matches_name_or_email() {
        let user = NewUser {
            name: "Ervin Howell".to_string(),
            email: "Shanna@melissa.tv".to_string(),
            phone: String::new(),
            company: String::new(),
        }
        .with_id(2);

        assert!(user.matches("ervin"));
        assert!(user.matches("MELISSA"));
        assert!(user.matches(""));
        assert!(!user.matches("graham"));
    }
}
