// Static path lists used by the probes

/// wp-config.php backup and editor-artifact variants, plus a few other files
/// that should never be served.
pub const BACKUP_FILES: &[&str] = &[
    "wp-config.php~",
    "wp-config.php.save",
    ".wp-config.php.bck",
    "wp-config.php.bck",
    ".wp-config.php.swp",
    "wp-config.php.swp",
    "wp-config.php.swo",
    "wp-config.php_bak",
    "wp-config.bak",
    "wp-config.php.bak",
    "wp-config.save",
    "wp-config.old",
    "wp-config.php.old",
    "wp-config.php.orig",
    "wp-config.orig",
    "wp-config.php.original",
    "wp-config.original",
    "wp-config.txt",
    "wp-config.php.txt",
    "wp-config.backup",
    "wp-config.php.backup",
    "wp-config.copy",
    "wp-config.php.copy",
    "wp-config.tmp",
    "wp-config.php.tmp",
    "wp-config.zip",
    "wp-config.php.zip",
    "wp-config.db",
    "wp-config.php.db",
    "wp-config.dat",
    "wp-config.php.dat",
    "wp-config.tar.gz",
    "wp-config.php.tar.gz",
    "wp-config.back",
    "wp-config.php.back",
    "wp-config.test",
    "wp-config.php.test",
    "wp-config.php.1",
    "wp-config.php.2",
    "wp-config.php.3",
    "wp-config.php._inc",
    "wp-config_inc",
    "wp-config.php.SAVE",
    ".wp-config.php.BCK",
    "wp-config.php.BCK",
    ".wp-config.php.SWP",
    "wp-config.php.SWP",
    "wp-config.php.SWO",
    "wp-config.php_BAK",
    "wp-config.BAK",
    "wp-config.php.BAK",
    "wp-config.SAVE",
    "wp-config.OLD",
    "wp-config.php.OLD",
    "wp-config.php.ORIG",
    "wp-config.ORIG",
    "wp-config.php.ORIGINAL",
    "wp-config.ORIGINAL",
    "wp-config.TXT",
    "wp-config.php.TXT",
    "wp-config.BACKUP",
    "wp-config.php.BACKUP",
    "wp-config.COPY",
    "wp-config.php.COPY",
    "wp-config.TMP",
    "wp-config.php.TMP",
    "wp-config.ZIP",
    "wp-config.php.ZIP",
    "wp-config.DB",
    "wp-config.php.DB",
    "wp-config.DAT",
    "wp-config.php.DAT",
    "wp-config.TAR.GZ",
    "wp-config.php.TAR.GZ",
    "wp-config.BACK",
    "wp-config.php.BACK",
    "wp-config.TEST",
    "wp-config.php.TEST",
    "wp-config.php._INC",
    "wp-config_INC",
    "wp-config.local.php",
    "wp-config.prod.php",
    "wp-config.dev.php",
    ".env",
    "README.md",
    ".gitignore",
];

/// (path, label) pairs checked for an `Index of` listing.
pub const LISTING_DIRECTORIES: &[(&str, &str)] = &[
    ("wp-content/uploads/", "Uploads"),
    ("wp-content/plugins/", "Plugins"),
    ("wp-content/themes/", "Themes"),
    ("wp-includes/", "Includes"),
    ("wp-admin/", "Admin"),
];

pub const KNOWN_PLUGINS: &[(&str, &str)] = &[
    ("wordpress-seo/wp-seo.php", "Yoast SEO"),
    ("akismet/akismet.php", "Akismet"),
    ("woocommerce/woocommerce.php", "WooCommerce"),
];

pub const KNOWN_THEMES: &[(&str, &str)] = &[
    ("twentytwentyfour/style.css", "Twenty Twenty-Four"),
    ("twentytwentythree/style.css", "Twenty Twenty-Three"),
    ("twentytwentytwo/style.css", "Twenty Twenty-Two"),
    ("astra/style.css", "Astra"),
];

pub const README_PATH: &str = "readme.html";
pub const DEBUG_LOG_PATH: &str = "debug.log";
pub const ROBOTS_PATH: &str = "robots.txt";
pub const XML_RPC_PATH: &str = "xmlrpc.php";
pub const FPD_PATH: &str = "wp-includes/rss-functions.php";
pub const USERS_ENDPOINT: &str = "wp-json/wp/v2/users";
pub const PLUGINS_ENDPOINT: &str = "wp-json/plugins/v1/all";
pub const THEMES_ENDPOINT: &str = "wp-json/wp/v2/themes";
pub const PLUGINS_DIRECTORY: &str = "wp-content/plugins/";
pub const THEMES_DIRECTORY: &str = "wp-content/themes/";
