use std::str::FromStr;
use anyhow::Result;
use clap::ArgMatches;
use regex::Regex;

#[derive(Clone, Debug)]
pub struct Filter {
    pub include: Regex,
    pub exclude: Regex,
}

impl Filter {
    pub fn new(args: &ArgMatches) -> Result<Self> {
        let include = join(args, "include").unwrap_or_else(|| ".*".to_string());
        let exclude = join(args, "exclude").unwrap_or_else(|| "^$".to_string());
        Ok(Self {
            include: Regex::new(&include)?,
            exclude: Regex::new(&exclude)?,
        })
    }

    pub fn check(&self, link: &str) -> bool {
        self.include.is_match(link) && !self.exclude.is_match(link)
    }
}

pub fn opt<T: FromStr>(arg: Option<&str>) -> Result<Option<T>> {
    Ok(arg.map(|s| T::from_str(s).map_err(|_| {
        let msg  = format!("invalid argument value '{}'", s);
        let kind = clap::ErrorKind::InvalidValue;
        clap::Error::with_description(&msg, kind)
    })).transpose()?)
}

fn join(args: &ArgMatches, name: &str) -> Option<String> {
    args.values_of(name).map(|vs| {
        vs.map(String::from).collect::<Vec<_>>().join("|")
    })
}
