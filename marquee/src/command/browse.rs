use clap::Parser;
use eyre::Result;
use marquee_client::session::Session;
use marquee_common::api::{MediaType, Movie, TimeWindow};

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// The title of the hero banner
    Featured,
    Popular {
        #[arg(long, short, default_value_t = 1)]
        page: u32,
    },
    Trending {
        /// all, movie or tv
        #[arg(long, short, default_value = "all")]
        media_type: MediaType,
        /// day or week
        #[arg(long, short, default_value = "day")]
        time_window: TimeWindow,
    },
    /// Titles of a single genre
    Genre {
        id: i64,
        #[arg(long, short, default_value_t = 1)]
        page: u32,
    },
    /// List all genres
    Genres,
}

pub(crate) fn print_movies(movies: &[Movie]) {
    for movie in movies {
        let year = movie
            .release_date
            .as_deref()
            .and_then(|x| x.get(..4))
            .unwrap_or("----");
        println!(
            "{:>8}  {year}  {:>4.1}  {}",
            movie.id, movie.vote_average, movie.title
        );
    }
}

impl Cmd {
    pub(crate) async fn run(self, session: &Session) -> Result<()> {
        let api = session.api();

        match self {
            Self::Featured => {
                let movie = api.featured().await?;
                println!("{}\n\n{}", movie.title, movie.overview);
            }
            Self::Popular { page } => print_movies(&api.popular(page).await?),
            Self::Trending {
                media_type,
                time_window,
            } => print_movies(&api.trending(media_type, time_window).await?),
            Self::Genre { id, page } => print_movies(&api.by_genre(id, page).await?),
            Self::Genres => {
                for genre in api.genres().await? {
                    println!("{:>6}  {}", genre.id, genre.name);
                }
            }
        }

        Ok(())
    }
}
