// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Emoji alias table

pub(super) static EMOJI: &[(&str, &str)] = &[
    ("grinning", "\u{1f600}"),
    ("smiley", "\u{1f603}"),
    ("smile", "\u{1f604}"),
    ("grin", "\u{1f601}"),
    ("laughing", "\u{1f606}"),
    ("satisfied", "\u{1f606}"),
    ("sweat_smile", "\u{1f605}"),
    ("rofl", "\u{1f923}"),
    ("joy", "\u{1f602}"),
    ("slightly_smiling_face", "\u{1f642}"),
    ("upside_down_face", "\u{1f643}"),
    ("wink", "\u{1f609}"),
    ("blush", "\u{1f60a}"),
    ("innocent", "\u{1f607}"),
    ("smiling_face_with_three_hearts", "\u{1f970}"),
    ("heart_eyes", "\u{1f60d}"),
    ("star_struck", "\u{1f929}"),
    ("kissing_heart", "\u{1f618}"),
    ("kissing", "\u{1f617}"),
    ("relaxed", "\u{263a}\u{fe0f}"),
    ("kissing_closed_eyes", "\u{1f61a}"),
    ("kissing_smiling_eyes", "\u{1f619}"),
    ("yum", "\u{1f60b}"),
    ("stuck_out_tongue", "\u{1f61b}"),
    ("stuck_out_tongue_winking_eye", "\u{1f61c}"),
    ("zany_face", "\u{1f92a}"),
    ("stuck_out_tongue_closed_eyes", "\u{1f61d}"),
    ("money_mouth_face", "\u{1f911}"),
    ("hugs", "\u{1f917}"),
    ("hand_over_mouth", "\u{1f92d}"),
    ("shushing_face", "\u{1f92b}"),
    ("thinking", "\u{1f914}"),
    ("zipper_mouth_face", "\u{1f910}"),
    ("raised_eyebrow", "\u{1f928}"),
    ("neutral_face", "\u{1f610}"),
    ("expressionless", "\u{1f611}"),
    ("no_mouth", "\u{1f636}"),
    ("smirk", "\u{1f60f}"),
    ("unamused", "\u{1f612}"),
    ("roll_eyes", "\u{1f644}"),
    ("grimacing", "\u{1f62c}"),
    ("lying_face", "\u{1f925}"),
    ("relieved", "\u{1f60c}"),
    ("pensive", "\u{1f614}"),
    ("sleepy", "\u{1f62a}"),
    ("drooling_face", "\u{1f924}"),
    ("sleeping", "\u{1f634}"),
    ("mask", "\u{1f637}"),
    ("face_with_thermometer", "\u{1f912}"),
    ("face_with_head_bandage", "\u{1f915}"),
    ("nauseated_face", "\u{1f922}"),
    ("vomiting_face", "\u{1f92e}"),
    ("sneezing_face", "\u{1f927}"),
    ("hot_face", "\u{1f975}"),
    ("cold_face", "\u{1f976}"),
    ("woozy_face", "\u{1f974}"),
    ("dizzy_face", "\u{1f635}"),
    ("exploding_head", "\u{1f92f}"),
    ("cowboy_hat_face", "\u{1f920}"),
    ("partying_face", "\u{1f973}"),
    ("sunglasses", "\u{1f60e}"),
    ("nerd_face", "\u{1f913}"),
    ("monocle_face", "\u{1f9d0}"),
    ("confused", "\u{1f615}"),
    ("worried", "\u{1f61f}"),
    ("slightly_frowning_face", "\u{1f641}"),
    ("frowning_face", "\u{2639}\u{fe0f}"),
    ("open_mouth", "\u{1f62e}"),
    ("hushed", "\u{1f62f}"),
    ("astonished", "\u{1f632}"),
    ("flushed", "\u{1f633}"),
    ("pleading_face", "\u{1f97a}"),
    ("frowning", "\u{1f626}"),
    ("anguished", "\u{1f627}"),
    ("fearful", "\u{1f628}"),
    ("cold_sweat", "\u{1f630}"),
    ("disappointed_relieved", "\u{1f625}"),
    ("cry", "\u{1f622}"),
    ("sob", "\u{1f62d}"),
    ("scream", "\u{1f631}"),
    ("confounded", "\u{1f616}"),
    ("persevere", "\u{1f623}"),
    ("disappointed", "\u{1f61e}"),
    ("sweat", "\u{1f613}"),
    ("weary", "\u{1f629}"),
    ("tired_face", "\u{1f62b}"),
    ("yawning_face", "\u{1f971}"),
    ("triumph", "\u{1f624}"),
    ("rage", "\u{1f621}"),
    ("pout", "\u{1f621}"),
    ("angry", "\u{1f620}"),
    ("cursing_face", "\u{1f92c}"),
    ("smiling_imp", "\u{1f608}"),
    ("imp", "\u{1f47f}"),
    ("skull", "\u{1f480}"),
    ("skull_and_crossbones", "\u{2620}\u{fe0f}"),
    ("hankey", "\u{1f4a9}"),
    ("poop", "\u{1f4a9}"),
    ("shit", "\u{1f4a9}"),
    ("clown_face", "\u{1f921}"),
    ("japanese_ogre", "\u{1f479}"),
    ("japanese_goblin", "\u{1f47a}"),
    ("ghost", "\u{1f47b}"),
    ("alien", "\u{1f47d}"),
    ("space_invader", "\u{1f47e}"),
    ("robot", "\u{1f916}"),
    ("smiley_cat", "\u{1f63a}"),
    ("smile_cat", "\u{1f638}"),
    ("joy_cat", "\u{1f639}"),
    ("heart_eyes_cat", "\u{1f63b}"),
    ("smirk_cat", "\u{1f63c}"),
    ("kissing_cat", "\u{1f63d}"),
    ("scream_cat", "\u{1f640}"),
    ("crying_cat_face", "\u{1f63f}"),
    ("pouting_cat", "\u{1f63e}"),
    ("see_no_evil", "\u{1f648}"),
    ("hear_no_evil", "\u{1f649}"),
    ("speak_no_evil", "\u{1f64a}"),
    ("kiss", "\u{1f48b}"),
    ("love_letter", "\u{1f48c}"),
    ("cupid", "\u{1f498}"),
    ("gift_heart", "\u{1f49d}"),
    ("sparkling_heart", "\u{1f496}"),
    ("heartpulse", "\u{1f497}"),
    ("heartbeat", "\u{1f493}"),
    ("revolving_hearts", "\u{1f49e}"),
    ("two_hearts", "\u{1f495}"),
    ("heart_decoration", "\u{1f49f}"),
    ("heavy_heart_exclamation", "\u{2763}\u{fe0f}"),
    ("broken_heart", "\u{1f494}"),
    ("heart", "\u{2764}\u{fe0f}"),
    ("orange_heart", "\u{1f9e1}"),
    ("yellow_heart", "\u{1f49b}"),
    ("green_heart", "\u{1f49a}"),
    ("blue_heart", "\u{1f499}"),
    ("purple_heart", "\u{1f49c}"),
    ("brown_heart", "\u{1f90e}"),
    ("black_heart", "\u{1f5a4}"),
    ("white_heart", "\u{1f90d}"),
    ("100", "\u{1f4af}"),
    ("anger", "\u{1f4a2}"),
    ("boom", "\u{1f4a5}"),
    ("collision", "\u{1f4a5}"),
    ("dizzy", "\u{1f4ab}"),
    ("sweat_drops", "\u{1f4a6}"),
    ("dash", "\u{1f4a8}"),
    ("hole", "\u{1f573}\u{fe0f}"),
    ("bomb", "\u{1f4a3}"),
    ("speech_balloon", "\u{1f4ac}"),
    ("left_speech_bubble", "\u{1f5e8}\u{fe0f}"),
    ("right_anger_bubble", "\u{1f5ef}\u{fe0f}"),
    ("thought_balloon", "\u{1f4ad}"),
    ("zzz", "\u{1f4a4}"),
    ("wave", "\u{1f44b}"),
    ("raised_back_of_hand", "\u{1f91a}"),
    ("raised_hand_with_fingers_splayed", "\u{1f590}\u{fe0f}"),
    ("hand", "\u{270b}"),
    ("raised_hand", "\u{270b}"),
    ("vulcan_salute", "\u{1f596}"),
    ("ok_hand", "\u{1f44c}"),
    ("pinching_hand", "\u{1f90f}"),
    ("v", "\u{270c}\u{fe0f}"),
    ("crossed_fingers", "\u{1f91e}"),
    ("love_you_gesture", "\u{1f91f}"),
    ("metal", "\u{1f918}"),
    ("call_me_hand", "\u{1f919}"),
    ("point_left", "\u{1f448}"),
    ("point_right", "\u{1f449}"),
    ("point_up_2", "\u{1f446}"),
    ("middle_finger", "\u{1f595}"),
    ("fu", "\u{1f595}"),
    ("point_down", "\u{1f447}"),
    ("point_up", "\u{261d}\u{fe0f}"),
    ("+1", "\u{1f44d}"),
    ("thumbsup", "\u{1f44d}"),
    ("-1", "\u{1f44e}"),
    ("thumbsdown", "\u{1f44e}"),
    ("fist_raised", "\u{270a}"),
    ("fist", "\u{270a}"),
    ("fist_oncoming", "\u{1f44a}"),
    ("facepunch", "\u{1f44a}"),
    ("punch", "\u{1f44a}"),
    ("fist_left", "\u{1f91b}"),
    ("fist_right", "\u{1f91c}"),
    ("clap", "\u{1f44f}"),
    ("raised_hands", "\u{1f64c}"),
    ("open_hands", "\u{1f450}"),
    ("palms_up_together", "\u{1f932}"),
    ("handshake", "\u{1f91d}"),
    ("pray", "\u{1f64f}"),
    ("writing_hand", "\u{270d}\u{fe0f}"),
    ("nail_care", "\u{1f485}"),
    ("selfie", "\u{1f933}"),
    ("muscle", "\u{1f4aa}"),
    ("mechanical_arm", "\u{1f9be}"),
    ("mechanical_leg", "\u{1f9bf}"),
    ("leg", "\u{1f9b5}"),
    ("foot", "\u{1f9b6}"),
    ("ear", "\u{1f442}"),
    ("ear_with_hearing_aid", "\u{1f9bb}"),
    ("nose", "\u{1f443}"),
    ("brain", "\u{1f9e0}"),
    ("tooth", "\u{1f9b7}"),
    ("bone", "\u{1f9b4}"),
    ("eyes", "\u{1f440}"),
    ("eye", "\u{1f441}\u{fe0f}"),
    ("tongue", "\u{1f445}"),
    ("lips", "\u{1f444}"),
    ("baby", "\u{1f476}"),
    ("child", "\u{1f9d2}"),
    ("boy", "\u{1f466}"),
    ("girl", "\u{1f467}"),
    ("adult", "\u{1f9d1}"),
    ("man", "\u{1f468}"),
    ("woman", "\u{1f469}"),
    ("older_adult", "\u{1f9d3}"),
    ("older_man", "\u{1f474}"),
    ("older_woman", "\u{1f475}"),
    ("frowning_person", "\u{1f64d}"),
    ("pouting_face", "\u{1f64e}"),
    ("no_good", "\u{1f645}"),
    ("ok_person", "\u{1f646}"),
    ("tipping_hand_person", "\u{1f481}"),
    ("raising_hand", "\u{1f64b}"),
    ("deaf_person", "\u{1f9cf}"),
    ("bow", "\u{1f647}"),
    ("facepalm", "\u{1f926}"),
    ("shrug", "\u{1f937}"),
    ("man_technologist", "\u{1f468}\u{200d}\u{1f4bb}"),
    ("woman_technologist", "\u{1f469}\u{200d}\u{1f4bb}"),
    ("man_scientist", "\u{1f468}\u{200d}\u{1f52c}"),
    ("woman_scientist", "\u{1f469}\u{200d}\u{1f52c}"),
    ("man_cook", "\u{1f468}\u{200d}\u{1f373}"),
    ("woman_cook", "\u{1f469}\u{200d}\u{1f373}"),
    ("man_mechanic", "\u{1f468}\u{200d}\u{1f527}"),
    ("woman_mechanic", "\u{1f469}\u{200d}\u{1f527}"),
    ("man_office_worker", "\u{1f468}\u{200d}\u{1f4bc}"),
    ("woman_office_worker", "\u{1f469}\u{200d}\u{1f4bc}"),
    ("man_teacher", "\u{1f468}\u{200d}\u{1f3eb}"),
    ("woman_teacher", "\u{1f469}\u{200d}\u{1f3eb}"),
    ("man_astronaut", "\u{1f468}\u{200d}\u{1f680}"),
    ("woman_astronaut", "\u{1f469}\u{200d}\u{1f680}"),
    ("man_firefighter", "\u{1f468}\u{200d}\u{1f692}"),
    ("woman_firefighter", "\u{1f469}\u{200d}\u{1f692}"),
    ("police_officer", "\u{1f46e}"),
    ("cop", "\u{1f46e}"),
    ("detective", "\u{1f575}\u{fe0f}"),
    ("guard", "\u{1f482}"),
    ("construction_worker", "\u{1f477}"),
    ("prince", "\u{1f934}"),
    ("princess", "\u{1f478}"),
    ("person_with_turban", "\u{1f473}"),
    ("man_with_gua_pi_mao", "\u{1f472}"),
    ("bearded_person", "\u{1f9d4}"),
    ("bride_with_veil", "\u{1f470}"),
    ("pregnant_woman", "\u{1f930}"),
    ("angel", "\u{1f47c}"),
    ("santa", "\u{1f385}"),
    ("mrs_claus", "\u{1f936}"),
    ("superhero", "\u{1f9b8}"),
    ("supervillain", "\u{1f9b9}"),
    ("mage", "\u{1f9d9}"),
    ("fairy", "\u{1f9da}"),
    ("vampire", "\u{1f9db}"),
    ("merperson", "\u{1f9dc}"),
    ("elf", "\u{1f9dd}"),
    ("genie", "\u{1f9de}"),
    ("zombie", "\u{1f9df}"),
    ("massage", "\u{1f486}"),
    ("haircut", "\u{1f487}"),
    ("walking", "\u{1f6b6}"),
    ("standing_person", "\u{1f9cd}"),
    ("kneeling_person", "\u{1f9ce}"),
    ("runner", "\u{1f3c3}"),
    ("running", "\u{1f3c3}"),
    ("dancer", "\u{1f483}"),
    ("man_dancing", "\u{1f57a}"),
    ("dancers", "\u{1f46f}"),
    ("person_climbing", "\u{1f9d7}"),
    ("skier", "\u{26f7}\u{fe0f}"),
    ("snowboarder", "\u{1f3c2}"),
    ("golfing", "\u{1f3cc}\u{fe0f}"),
    ("surfer", "\u{1f3c4}"),
    ("rowboat", "\u{1f6a3}"),
    ("swimmer", "\u{1f3ca}"),
    ("bicyclist", "\u{1f6b4}"),
    ("mountain_bicyclist", "\u{1f6b5}"),
    ("cartwheeling", "\u{1f938}"),
    ("wrestling", "\u{1f93c}"),
    ("juggling_person", "\u{1f939}"),
    ("bath", "\u{1f6c0}"),
    ("sleeping_bed", "\u{1f6cc}"),
    ("couple", "\u{1f46b}"),
    ("two_men_holding_hands", "\u{1f46c}"),
    ("two_women_holding_hands", "\u{1f46d}"),
    ("family", "\u{1f46a}"),
    ("speaking_head", "\u{1f5e3}\u{fe0f}"),
    ("bust_in_silhouette", "\u{1f464}"),
    ("busts_in_silhouette", "\u{1f465}"),
    ("footprints", "\u{1f463}"),
    ("monkey_face", "\u{1f435}"),
    ("monkey", "\u{1f412}"),
    ("gorilla", "\u{1f98d}"),
    ("dog", "\u{1f436}"),
    ("dog2", "\u{1f415}"),
    ("guide_dog", "\u{1f9ae}"),
    ("poodle", "\u{1f429}"),
    ("wolf", "\u{1f43a}"),
    ("fox_face", "\u{1f98a}"),
    ("raccoon", "\u{1f99d}"),
    ("cat", "\u{1f431}"),
    ("cat2", "\u{1f408}"),
    ("lion", "\u{1f981}"),
    ("tiger", "\u{1f42f}"),
    ("tiger2", "\u{1f405}"),
    ("leopard", "\u{1f406}"),
    ("horse", "\u{1f434}"),
    ("racehorse", "\u{1f40e}"),
    ("unicorn", "\u{1f984}"),
    ("zebra", "\u{1f993}"),
    ("deer", "\u{1f98c}"),
    ("cow", "\u{1f42e}"),
    ("ox", "\u{1f402}"),
    ("water_buffalo", "\u{1f403}"),
    ("cow2", "\u{1f404}"),
    ("pig", "\u{1f437}"),
    ("pig2", "\u{1f416}"),
    ("boar", "\u{1f417}"),
    ("pig_nose", "\u{1f43d}"),
    ("ram", "\u{1f40f}"),
    ("sheep", "\u{1f411}"),
    ("goat", "\u{1f410}"),
    ("dromedary_camel", "\u{1f42a}"),
    ("camel", "\u{1f42b}"),
    ("llama", "\u{1f999}"),
    ("giraffe", "\u{1f992}"),
    ("elephant", "\u{1f418}"),
    ("rhinoceros", "\u{1f98f}"),
    ("hippopotamus", "\u{1f99b}"),
    ("mouse", "\u{1f42d}"),
    ("mouse2", "\u{1f401}"),
    ("rat", "\u{1f400}"),
    ("hamster", "\u{1f439}"),
    ("rabbit", "\u{1f430}"),
    ("rabbit2", "\u{1f407}"),
    ("chipmunk", "\u{1f43f}\u{fe0f}"),
    ("hedgehog", "\u{1f994}"),
    ("bat", "\u{1f987}"),
    ("bear", "\u{1f43b}"),
    ("koala", "\u{1f428}"),
    ("panda_face", "\u{1f43c}"),
    ("sloth", "\u{1f9a5}"),
    ("otter", "\u{1f9a6}"),
    ("skunk", "\u{1f9a8}"),
    ("kangaroo", "\u{1f998}"),
    ("badger", "\u{1f9a1}"),
    ("feet", "\u{1f43e}"),
    ("paw_prints", "\u{1f43e}"),
    ("turkey", "\u{1f983}"),
    ("chicken", "\u{1f414}"),
    ("rooster", "\u{1f413}"),
    ("hatching_chick", "\u{1f423}"),
    ("baby_chick", "\u{1f424}"),
    ("hatched_chick", "\u{1f425}"),
    ("bird", "\u{1f426}"),
    ("penguin", "\u{1f427}"),
    ("dove", "\u{1f54a}\u{fe0f}"),
    ("eagle", "\u{1f985}"),
    ("duck", "\u{1f986}"),
    ("swan", "\u{1f9a2}"),
    ("owl", "\u{1f989}"),
    ("flamingo", "\u{1f9a9}"),
    ("peacock", "\u{1f99a}"),
    ("parrot", "\u{1f99c}"),
    ("frog", "\u{1f438}"),
    ("crocodile", "\u{1f40a}"),
    ("turtle", "\u{1f422}"),
    ("lizard", "\u{1f98e}"),
    ("snake", "\u{1f40d}"),
    ("dragon_face", "\u{1f432}"),
    ("dragon", "\u{1f409}"),
    ("sauropod", "\u{1f995}"),
    ("t-rex", "\u{1f996}"),
    ("whale", "\u{1f433}"),
    ("whale2", "\u{1f40b}"),
    ("dolphin", "\u{1f42c}"),
    ("flipper", "\u{1f42c}"),
    ("fish", "\u{1f41f}"),
    ("tropical_fish", "\u{1f420}"),
    ("blowfish", "\u{1f421}"),
    ("shark", "\u{1f988}"),
    ("octopus", "\u{1f419}"),
    ("shell", "\u{1f41a}"),
    ("snail", "\u{1f40c}"),
    ("butterfly", "\u{1f98b}"),
    ("bug", "\u{1f41b}"),
    ("ant", "\u{1f41c}"),
    ("bee", "\u{1f41d}"),
    ("honeybee", "\u{1f41d}"),
    ("beetle", "\u{1f41e}"),
    ("cricket", "\u{1f997}"),
    ("spider", "\u{1f577}\u{fe0f}"),
    ("spider_web", "\u{1f578}\u{fe0f}"),
    ("scorpion", "\u{1f982}"),
    ("mosquito", "\u{1f99f}"),
    ("microbe", "\u{1f9a0}"),
    ("bouquet", "\u{1f490}"),
    ("cherry_blossom", "\u{1f338}"),
    ("white_flower", "\u{1f4ae}"),
    ("rosette", "\u{1f3f5}\u{fe0f}"),
    ("rose", "\u{1f339}"),
    ("wilted_flower", "\u{1f940}"),
    ("hibiscus", "\u{1f33a}"),
    ("sunflower", "\u{1f33b}"),
    ("blossom", "\u{1f33c}"),
    ("tulip", "\u{1f337}"),
    ("seedling", "\u{1f331}"),
    ("evergreen_tree", "\u{1f332}"),
    ("deciduous_tree", "\u{1f333}"),
    ("palm_tree", "\u{1f334}"),
    ("cactus", "\u{1f335}"),
    ("ear_of_rice", "\u{1f33e}"),
    ("herb", "\u{1f33f}"),
    ("shamrock", "\u{2618}\u{fe0f}"),
    ("four_leaf_clover", "\u{1f340}"),
    ("maple_leaf", "\u{1f341}"),
    ("fallen_leaf", "\u{1f342}"),
    ("leaves", "\u{1f343}"),
    ("grapes", "\u{1f347}"),
    ("melon", "\u{1f348}"),
    ("watermelon", "\u{1f349}"),
    ("tangerine", "\u{1f34a}"),
    ("orange", "\u{1f34a}"),
    ("mandarin", "\u{1f34a}"),
    ("lemon", "\u{1f34b}"),
    ("banana", "\u{1f34c}"),
    ("pineapple", "\u{1f34d}"),
    ("mango", "\u{1f96d}"),
    ("apple", "\u{1f34e}"),
    ("green_apple", "\u{1f34f}"),
    ("pear", "\u{1f350}"),
    ("peach", "\u{1f351}"),
    ("cherries", "\u{1f352}"),
    ("strawberry", "\u{1f353}"),
    ("kiwi_fruit", "\u{1f95d}"),
    ("tomato", "\u{1f345}"),
    ("coconut", "\u{1f965}"),
    ("avocado", "\u{1f951}"),
    ("eggplant", "\u{1f346}"),
    ("potato", "\u{1f954}"),
    ("carrot", "\u{1f955}"),
    ("corn", "\u{1f33d}"),
    ("hot_pepper", "\u{1f336}\u{fe0f}"),
    ("cucumber", "\u{1f952}"),
    ("leafy_green", "\u{1f96c}"),
    ("broccoli", "\u{1f966}"),
    ("garlic", "\u{1f9c4}"),
    ("onion", "\u{1f9c5}"),
    ("mushroom", "\u{1f344}"),
    ("peanuts", "\u{1f95c}"),
    ("chestnut", "\u{1f330}"),
    ("bread", "\u{1f35e}"),
    ("croissant", "\u{1f950}"),
    ("baguette_bread", "\u{1f956}"),
    ("pretzel", "\u{1f968}"),
    ("bagel", "\u{1f96f}"),
    ("pancakes", "\u{1f95e}"),
    ("waffle", "\u{1f9c7}"),
    ("cheese", "\u{1f9c0}"),
    ("meat_on_bone", "\u{1f356}"),
    ("poultry_leg", "\u{1f357}"),
    ("cut_of_meat", "\u{1f969}"),
    ("bacon", "\u{1f953}"),
    ("hamburger", "\u{1f354}"),
    ("fries", "\u{1f35f}"),
    ("pizza", "\u{1f355}"),
    ("hotdog", "\u{1f32d}"),
    ("sandwich", "\u{1f96a}"),
    ("taco", "\u{1f32e}"),
    ("burrito", "\u{1f32f}"),
    ("stuffed_flatbread", "\u{1f959}"),
    ("falafel", "\u{1f9c6}"),
    ("egg", "\u{1f95a}"),
    ("fried_egg", "\u{1f373}"),
    ("cooking", "\u{1f373}"),
    ("shallow_pan_of_food", "\u{1f958}"),
    ("stew", "\u{1f372}"),
    ("bowl_with_spoon", "\u{1f963}"),
    ("green_salad", "\u{1f957}"),
    ("popcorn", "\u{1f37f}"),
    ("butter", "\u{1f9c8}"),
    ("salt", "\u{1f9c2}"),
    ("canned_food", "\u{1f96b}"),
    ("bento", "\u{1f371}"),
    ("rice_cracker", "\u{1f358}"),
    ("rice_ball", "\u{1f359}"),
    ("rice", "\u{1f35a}"),
    ("curry", "\u{1f35b}"),
    ("ramen", "\u{1f35c}"),
    ("spaghetti", "\u{1f35d}"),
    ("sweet_potato", "\u{1f360}"),
    ("oden", "\u{1f362}"),
    ("sushi", "\u{1f363}"),
    ("fried_shrimp", "\u{1f364}"),
    ("fish_cake", "\u{1f365}"),
    ("moon_cake", "\u{1f96e}"),
    ("dango", "\u{1f361}"),
    ("dumpling", "\u{1f95f}"),
    ("fortune_cookie", "\u{1f960}"),
    ("takeout_box", "\u{1f961}"),
    ("crab", "\u{1f980}"),
    ("lobster", "\u{1f99e}"),
    ("shrimp", "\u{1f990}"),
    ("squid", "\u{1f991}"),
    ("oyster", "\u{1f9aa}"),
    ("icecream", "\u{1f366}"),
    ("shaved_ice", "\u{1f367}"),
    ("ice_cream", "\u{1f368}"),
    ("doughnut", "\u{1f369}"),
    ("cookie", "\u{1f36a}"),
    ("birthday", "\u{1f382}"),
    ("cake", "\u{1f370}"),
    ("cupcake", "\u{1f9c1}"),
    ("pie", "\u{1f967}"),
    ("chocolate_bar", "\u{1f36b}"),
    ("candy", "\u{1f36c}"),
    ("lollipop", "\u{1f36d}"),
    ("custard", "\u{1f36e}"),
    ("honey_pot", "\u{1f36f}"),
    ("baby_bottle", "\u{1f37c}"),
    ("milk_glass", "\u{1f95b}"),
    ("coffee", "\u{2615}"),
    ("tea", "\u{1f375}"),
    ("sake", "\u{1f376}"),
    ("champagne", "\u{1f37e}"),
    ("wine_glass", "\u{1f377}"),
    ("cocktail", "\u{1f378}"),
    ("tropical_drink", "\u{1f379}"),
    ("beer", "\u{1f37a}"),
    ("beers", "\u{1f37b}"),
    ("clinking_glasses", "\u{1f942}"),
    ("tumbler_glass", "\u{1f943}"),
    ("cup_with_straw", "\u{1f964}"),
    ("beverage_box", "\u{1f9c3}"),
    ("mate", "\u{1f9c9}"),
    ("ice_cube", "\u{1f9ca}"),
    ("chopsticks", "\u{1f962}"),
    ("plate_with_cutlery", "\u{1f37d}\u{fe0f}"),
    ("fork_and_knife", "\u{1f374}"),
    ("spoon", "\u{1f944}"),
    ("hocho", "\u{1f52a}"),
    ("knife", "\u{1f52a}"),
    ("amphora", "\u{1f3fa}"),
    ("earth_africa", "\u{1f30d}"),
    ("earth_americas", "\u{1f30e}"),
    ("earth_asia", "\u{1f30f}"),
    ("globe_with_meridians", "\u{1f310}"),
    ("world_map", "\u{1f5fa}\u{fe0f}"),
    ("japan", "\u{1f5fe}"),
    ("compass", "\u{1f9ed}"),
    ("mountain_snow", "\u{1f3d4}\u{fe0f}"),
    ("mountain", "\u{26f0}\u{fe0f}"),
    ("volcano", "\u{1f30b}"),
    ("mount_fuji", "\u{1f5fb}"),
    ("camping", "\u{1f3d5}\u{fe0f}"),
    ("beach_umbrella", "\u{1f3d6}\u{fe0f}"),
    ("desert", "\u{1f3dc}\u{fe0f}"),
    ("desert_island", "\u{1f3dd}\u{fe0f}"),
    ("national_park", "\u{1f3de}\u{fe0f}"),
    ("stadium", "\u{1f3df}\u{fe0f}"),
    ("classical_building", "\u{1f3db}\u{fe0f}"),
    ("building_construction", "\u{1f3d7}\u{fe0f}"),
    ("bricks", "\u{1f9f1}"),
    ("houses", "\u{1f3d8}\u{fe0f}"),
    ("derelict_house", "\u{1f3da}\u{fe0f}"),
    ("house", "\u{1f3e0}"),
    ("house_with_garden", "\u{1f3e1}"),
    ("office", "\u{1f3e2}"),
    ("post_office", "\u{1f3e3}"),
    ("european_post_office", "\u{1f3e4}"),
    ("hospital", "\u{1f3e5}"),
    ("bank", "\u{1f3e6}"),
    ("hotel", "\u{1f3e8}"),
    ("love_hotel", "\u{1f3e9}"),
    ("convenience_store", "\u{1f3ea}"),
    ("school", "\u{1f3eb}"),
    ("department_store", "\u{1f3ec}"),
    ("factory", "\u{1f3ed}"),
    ("japanese_castle", "\u{1f3ef}"),
    ("european_castle", "\u{1f3f0}"),
    ("wedding", "\u{1f492}"),
    ("tokyo_tower", "\u{1f5fc}"),
    ("statue_of_liberty", "\u{1f5fd}"),
    ("church", "\u{26ea}"),
    ("mosque", "\u{1f54c}"),
    ("hindu_temple", "\u{1f6d5}"),
    ("synagogue", "\u{1f54d}"),
    ("shinto_shrine", "\u{26e9}\u{fe0f}"),
    ("kaaba", "\u{1f54b}"),
    ("fountain", "\u{26f2}"),
    ("tent", "\u{26fa}"),
    ("foggy", "\u{1f301}"),
    ("night_with_stars", "\u{1f303}"),
    ("cityscape", "\u{1f3d9}\u{fe0f}"),
    ("sunrise_over_mountains", "\u{1f304}"),
    ("sunrise", "\u{1f305}"),
    ("city_sunset", "\u{1f306}"),
    ("city_sunrise", "\u{1f307}"),
    ("bridge_at_night", "\u{1f309}"),
    ("hotsprings", "\u{2668}\u{fe0f}"),
    ("carousel_horse", "\u{1f3a0}"),
    ("ferris_wheel", "\u{1f3a1}"),
    ("roller_coaster", "\u{1f3a2}"),
    ("barber", "\u{1f488}"),
    ("circus_tent", "\u{1f3aa}"),
    ("steam_locomotive", "\u{1f682}"),
    ("railway_car", "\u{1f683}"),
    ("bullettrain_side", "\u{1f684}"),
    ("bullettrain_front", "\u{1f685}"),
    ("train2", "\u{1f686}"),
    ("metro", "\u{1f687}"),
    ("light_rail", "\u{1f688}"),
    ("station", "\u{1f689}"),
    ("tram", "\u{1f68a}"),
    ("monorail", "\u{1f69d}"),
    ("mountain_railway", "\u{1f69e}"),
    ("train", "\u{1f68b}"),
    ("bus", "\u{1f68c}"),
    ("oncoming_bus", "\u{1f68d}"),
    ("trolleybus", "\u{1f68e}"),
    ("minibus", "\u{1f690}"),
    ("ambulance", "\u{1f691}"),
    ("fire_engine", "\u{1f692}"),
    ("police_car", "\u{1f693}"),
    ("oncoming_police_car", "\u{1f694}"),
    ("taxi", "\u{1f695}"),
    ("oncoming_taxi", "\u{1f696}"),
    ("car", "\u{1f697}"),
    ("red_car", "\u{1f697}"),
    ("oncoming_automobile", "\u{1f698}"),
    ("blue_car", "\u{1f699}"),
    ("truck", "\u{1f69a}"),
    ("articulated_lorry", "\u{1f69b}"),
    ("tractor", "\u{1f69c}"),
    ("racing_car", "\u{1f3ce}\u{fe0f}"),
    ("motorcycle", "\u{1f3cd}\u{fe0f}"),
    ("motor_scooter", "\u{1f6f5}"),
    ("manual_wheelchair", "\u{1f9bd}"),
    ("motorized_wheelchair", "\u{1f9bc}"),
    ("auto_rickshaw", "\u{1f6fa}"),
    ("bike", "\u{1f6b2}"),
    ("kick_scooter", "\u{1f6f4}"),
    ("skateboard", "\u{1f6f9}"),
    ("busstop", "\u{1f68f}"),
    ("motorway", "\u{1f6e3}\u{fe0f}"),
    ("railway_track", "\u{1f6e4}\u{fe0f}"),
    ("oil_drum", "\u{1f6e2}\u{fe0f}"),
    ("fuelpump", "\u{26fd}"),
    ("rotating_light", "\u{1f6a8}"),
    ("traffic_light", "\u{1f6a5}"),
    ("vertical_traffic_light", "\u{1f6a6}"),
    ("stop_sign", "\u{1f6d1}"),
    ("construction", "\u{1f6a7}"),
    ("anchor", "\u{2693}"),
    ("boat", "\u{26f5}"),
    ("sailboat", "\u{26f5}"),
    ("canoe", "\u{1f6f6}"),
    ("speedboat", "\u{1f6a4}"),
    ("passenger_ship", "\u{1f6f3}\u{fe0f}"),
    ("ferry", "\u{26f4}\u{fe0f}"),
    ("motor_boat", "\u{1f6e5}\u{fe0f}"),
    ("ship", "\u{1f6a2}"),
    ("airplane", "\u{2708}\u{fe0f}"),
    ("small_airplane", "\u{1f6e9}\u{fe0f}"),
    ("flight_departure", "\u{1f6eb}"),
    ("flight_arrival", "\u{1f6ec}"),
    ("parachute", "\u{1fa82}"),
    ("seat", "\u{1f4ba}"),
    ("helicopter", "\u{1f681}"),
    ("suspension_railway", "\u{1f69f}"),
    ("mountain_cableway", "\u{1f6a0}"),
    ("aerial_tramway", "\u{1f6a1}"),
    ("artificial_satellite", "\u{1f6f0}\u{fe0f}"),
    ("rocket", "\u{1f680}"),
    ("flying_saucer", "\u{1f6f8}"),
    ("bellhop_bell", "\u{1f6ce}\u{fe0f}"),
    ("luggage", "\u{1f9f3}"),
    ("hourglass", "\u{231b}"),
    ("hourglass_flowing_sand", "\u{23f3}"),
    ("watch", "\u{231a}"),
    ("alarm_clock", "\u{23f0}"),
    ("stopwatch", "\u{23f1}\u{fe0f}"),
    ("timer_clock", "\u{23f2}\u{fe0f}"),
    ("mantelpiece_clock", "\u{1f570}\u{fe0f}"),
    ("clock12", "\u{1f55b}"),
    ("clock1", "\u{1f550}"),
    ("clock2", "\u{1f551}"),
    ("clock3", "\u{1f552}"),
    ("clock4", "\u{1f553}"),
    ("clock5", "\u{1f554}"),
    ("clock6", "\u{1f555}"),
    ("clock7", "\u{1f556}"),
    ("clock8", "\u{1f557}"),
    ("clock9", "\u{1f558}"),
    ("clock10", "\u{1f559}"),
    ("clock11", "\u{1f55a}"),
    ("new_moon", "\u{1f311}"),
    ("waxing_crescent_moon", "\u{1f312}"),
    ("first_quarter_moon", "\u{1f313}"),
    ("moon", "\u{1f314}"),
    ("waxing_gibbous_moon", "\u{1f314}"),
    ("full_moon", "\u{1f315}"),
    ("waning_gibbous_moon", "\u{1f316}"),
    ("last_quarter_moon", "\u{1f317}"),
    ("waning_crescent_moon", "\u{1f318}"),
    ("crescent_moon", "\u{1f319}"),
    ("new_moon_with_face", "\u{1f31a}"),
    ("first_quarter_moon_with_face", "\u{1f31b}"),
    ("last_quarter_moon_with_face", "\u{1f31c}"),
    ("thermometer", "\u{1f321}\u{fe0f}"),
    ("sunny", "\u{2600}\u{fe0f}"),
    ("full_moon_with_face", "\u{1f31d}"),
    ("sun_with_face", "\u{1f31e}"),
    ("ringed_planet", "\u{1fa90}"),
    ("star", "\u{2b50}"),
    ("star2", "\u{1f31f}"),
    ("stars", "\u{1f320}"),
    ("milky_way", "\u{1f30c}"),
    ("cloud", "\u{2601}\u{fe0f}"),
    ("partly_sunny", "\u{26c5}"),
    ("cloud_with_lightning_and_rain", "\u{26c8}\u{fe0f}"),
    ("sun_behind_small_cloud", "\u{1f324}\u{fe0f}"),
    ("sun_behind_large_cloud", "\u{1f325}\u{fe0f}"),
    ("sun_behind_rain_cloud", "\u{1f326}\u{fe0f}"),
    ("cloud_with_rain", "\u{1f327}\u{fe0f}"),
    ("cloud_with_snow", "\u{1f328}\u{fe0f}"),
    ("cloud_with_lightning", "\u{1f329}\u{fe0f}"),
    ("tornado", "\u{1f32a}\u{fe0f}"),
    ("fog", "\u{1f32b}\u{fe0f}"),
    ("wind_face", "\u{1f32c}\u{fe0f}"),
    ("cyclone", "\u{1f300}"),
    ("rainbow", "\u{1f308}"),
    ("closed_umbrella", "\u{1f302}"),
    ("open_umbrella", "\u{2602}\u{fe0f}"),
    ("umbrella", "\u{2614}"),
    ("parasol_on_ground", "\u{26f1}\u{fe0f}"),
    ("zap", "\u{26a1}\u{fe0f}"),
    ("snowflake", "\u{2744}\u{fe0f}"),
    ("snowman_with_snow", "\u{2603}\u{fe0f}"),
    ("snowman", "\u{26c4}"),
    ("comet", "\u{2604}\u{fe0f}"),
    ("fire", "\u{1f525}"),
    ("droplet", "\u{1f4a7}"),
    ("ocean", "\u{1f30a}"),
    ("jack_o_lantern", "\u{1f383}"),
    ("christmas_tree", "\u{1f384}"),
    ("fireworks", "\u{1f386}"),
    ("sparkler", "\u{1f387}"),
    ("firecracker", "\u{1f9e8}"),
    ("sparkles", "\u{2728}"),
    ("balloon", "\u{1f388}"),
    ("tada", "\u{1f389}"),
    ("confetti_ball", "\u{1f38a}"),
    ("tanabata_tree", "\u{1f38b}"),
    ("bamboo", "\u{1f38d}"),
    ("dolls", "\u{1f38e}"),
    ("flags", "\u{1f38f}"),
    ("wind_chime", "\u{1f390}"),
    ("rice_scene", "\u{1f391}"),
    ("red_envelope", "\u{1f9e7}"),
    ("ribbon", "\u{1f380}"),
    ("gift", "\u{1f381}"),
    ("reminder_ribbon", "\u{1f397}\u{fe0f}"),
    ("tickets", "\u{1f39f}\u{fe0f}"),
    ("ticket", "\u{1f3ab}"),
    ("medal_military", "\u{1f396}\u{fe0f}"),
    ("trophy", "\u{1f3c6}"),
    ("medal_sports", "\u{1f3c5}"),
    ("1st_place_medal", "\u{1f947}"),
    ("2nd_place_medal", "\u{1f948}"),
    ("3rd_place_medal", "\u{1f949}"),
    ("soccer", "\u{26bd}"),
    ("baseball", "\u{26be}"),
    ("softball", "\u{1f94e}"),
    ("basketball", "\u{1f3c0}"),
    ("volleyball", "\u{1f3d0}"),
    ("football", "\u{1f3c8}"),
    ("rugby_football", "\u{1f3c9}"),
    ("tennis", "\u{1f3be}"),
    ("flying_disc", "\u{1f94f}"),
    ("bowling", "\u{1f3b3}"),
    ("cricket_game", "\u{1f3cf}"),
    ("field_hockey", "\u{1f3d1}"),
    ("ice_hockey", "\u{1f3d2}"),
    ("lacrosse", "\u{1f94d}"),
    ("ping_pong", "\u{1f3d3}"),
    ("badminton", "\u{1f3f8}"),
    ("boxing_glove", "\u{1f94a}"),
    ("martial_arts_uniform", "\u{1f94b}"),
    ("goal_net", "\u{1f945}"),
    ("golf", "\u{26f3}"),
    ("ice_skate", "\u{26f8}\u{fe0f}"),
    ("fishing_pole_and_fish", "\u{1f3a3}"),
    ("diving_mask", "\u{1f93f}"),
    ("running_shirt_with_sash", "\u{1f3bd}"),
    ("ski", "\u{1f3bf}"),
    ("sled", "\u{1f6f7}"),
    ("curling_stone", "\u{1f94c}"),
    ("dart", "\u{1f3af}"),
    ("yo_yo", "\u{1fa80}"),
    ("kite", "\u{1fa81}"),
    ("8ball", "\u{1f3b1}"),
    ("crystal_ball", "\u{1f52e}"),
    ("nazar_amulet", "\u{1f9ff}"),
    ("video_game", "\u{1f3ae}"),
    ("joystick", "\u{1f579}\u{fe0f}"),
    ("slot_machine", "\u{1f3b0}"),
    ("game_die", "\u{1f3b2}"),
    ("jigsaw", "\u{1f9e9}"),
    ("teddy_bear", "\u{1f9f8}"),
    ("spades", "\u{2660}\u{fe0f}"),
    ("hearts", "\u{2665}\u{fe0f}"),
    ("diamonds", "\u{2666}\u{fe0f}"),
    ("clubs", "\u{2663}\u{fe0f}"),
    ("chess_pawn", "\u{265f}\u{fe0f}"),
    ("black_joker", "\u{1f0cf}"),
    ("mahjong", "\u{1f004}"),
    ("flower_playing_cards", "\u{1f3b4}"),
    ("performing_arts", "\u{1f3ad}"),
    ("framed_picture", "\u{1f5bc}\u{fe0f}"),
    ("art", "\u{1f3a8}"),
    ("thread", "\u{1f9f5}"),
    ("yarn", "\u{1f9f6}"),
    ("eyeglasses", "\u{1f453}"),
    ("dark_sunglasses", "\u{1f576}\u{fe0f}"),
    ("goggles", "\u{1f97d}"),
    ("lab_coat", "\u{1f97c}"),
    ("safety_vest", "\u{1f9ba}"),
    ("necktie", "\u{1f454}"),
    ("shirt", "\u{1f455}"),
    ("tshirt", "\u{1f455}"),
    ("jeans", "\u{1f456}"),
    ("scarf", "\u{1f9e3}"),
    ("gloves", "\u{1f9e4}"),
    ("coat", "\u{1f9e5}"),
    ("socks", "\u{1f9e6}"),
    ("dress", "\u{1f457}"),
    ("kimono", "\u{1f458}"),
    ("sari", "\u{1f97b}"),
    ("bikini", "\u{1f459}"),
    ("womans_clothes", "\u{1f45a}"),
    ("purse", "\u{1f45b}"),
    ("handbag", "\u{1f45c}"),
    ("pouch", "\u{1f45d}"),
    ("shopping", "\u{1f6cd}\u{fe0f}"),
    ("school_satchel", "\u{1f392}"),
    ("mans_shoe", "\u{1f45e}"),
    ("shoe", "\u{1f45e}"),
    ("athletic_shoe", "\u{1f45f}"),
    ("hiking_boot", "\u{1f97e}"),
    ("flat_shoe", "\u{1f97f}"),
    ("high_heel", "\u{1f460}"),
    ("sandal", "\u{1f461}"),
    ("ballet_shoes", "\u{1fa70}"),
    ("boot", "\u{1f462}"),
    ("crown", "\u{1f451}"),
    ("womans_hat", "\u{1f452}"),
    ("tophat", "\u{1f3a9}"),
    ("mortar_board", "\u{1f393}"),
    ("billed_cap", "\u{1f9e2}"),
    ("rescue_worker_helmet", "\u{26d1}\u{fe0f}"),
    ("prayer_beads", "\u{1f4ff}"),
    ("lipstick", "\u{1f484}"),
    ("ring", "\u{1f48d}"),
    ("gem", "\u{1f48e}"),
    ("mute", "\u{1f507}"),
    ("speaker", "\u{1f508}"),
    ("sound", "\u{1f509}"),
    ("loud_sound", "\u{1f50a}"),
    ("loudspeaker", "\u{1f4e2}"),
    ("mega", "\u{1f4e3}"),
    ("postal_horn", "\u{1f4ef}"),
    ("bell", "\u{1f514}"),
    ("no_bell", "\u{1f515}"),
    ("musical_score", "\u{1f3bc}"),
    ("musical_note", "\u{1f3b5}"),
    ("notes", "\u{1f3b6}"),
    ("studio_microphone", "\u{1f399}\u{fe0f}"),
    ("level_slider", "\u{1f39a}\u{fe0f}"),
    ("control_knobs", "\u{1f39b}\u{fe0f}"),
    ("microphone", "\u{1f3a4}"),
    ("headphones", "\u{1f3a7}"),
    ("radio", "\u{1f4fb}"),
    ("saxophone", "\u{1f3b7}"),
    ("guitar", "\u{1f3b8}"),
    ("musical_keyboard", "\u{1f3b9}"),
    ("trumpet", "\u{1f3ba}"),
    ("violin", "\u{1f3bb}"),
    ("banjo", "\u{1fa95}"),
    ("drum", "\u{1f941}"),
    ("iphone", "\u{1f4f1}"),
    ("calling", "\u{1f4f2}"),
    ("phone", "\u{260e}\u{fe0f}"),
    ("telephone", "\u{260e}\u{fe0f}"),
    ("telephone_receiver", "\u{1f4de}"),
    ("pager", "\u{1f4df}"),
    ("fax", "\u{1f4e0}"),
    ("battery", "\u{1f50b}"),
    ("electric_plug", "\u{1f50c}"),
    ("computer", "\u{1f4bb}"),
    ("desktop_computer", "\u{1f5a5}\u{fe0f}"),
    ("printer", "\u{1f5a8}\u{fe0f}"),
    ("keyboard", "\u{2328}\u{fe0f}"),
    ("computer_mouse", "\u{1f5b1}\u{fe0f}"),
    ("trackball", "\u{1f5b2}\u{fe0f}"),
    ("minidisc", "\u{1f4bd}"),
    ("floppy_disk", "\u{1f4be}"),
    ("cd", "\u{1f4bf}"),
    ("dvd", "\u{1f4c0}"),
    ("abacus", "\u{1f9ee}"),
    ("movie_camera", "\u{1f3a5}"),
    ("film_strip", "\u{1f39e}\u{fe0f}"),
    ("film_projector", "\u{1f4fd}\u{fe0f}"),
    ("clapper", "\u{1f3ac}"),
    ("tv", "\u{1f4fa}"),
    ("camera", "\u{1f4f7}"),
    ("camera_flash", "\u{1f4f8}"),
    ("video_camera", "\u{1f4f9}"),
    ("vhs", "\u{1f4fc}"),
    ("mag", "\u{1f50d}"),
    ("mag_right", "\u{1f50e}"),
    ("candle", "\u{1f56f}\u{fe0f}"),
    ("bulb", "\u{1f4a1}"),
    ("flashlight", "\u{1f526}"),
    ("izakaya_lantern", "\u{1f3ee}"),
    ("lantern", "\u{1f3ee}"),
    ("diya_lamp", "\u{1fa94}"),
    ("notebook_with_decorative_cover", "\u{1f4d4}"),
    ("closed_book", "\u{1f4d5}"),
    ("book", "\u{1f4d6}"),
    ("open_book", "\u{1f4d6}"),
    ("green_book", "\u{1f4d7}"),
    ("blue_book", "\u{1f4d8}"),
    ("orange_book", "\u{1f4d9}"),
    ("books", "\u{1f4da}"),
    ("notebook", "\u{1f4d3}"),
    ("ledger", "\u{1f4d2}"),
    ("page_with_curl", "\u{1f4c3}"),
    ("scroll", "\u{1f4dc}"),
    ("page_facing_up", "\u{1f4c4}"),
    ("newspaper", "\u{1f4f0}"),
    ("newspaper_roll", "\u{1f5de}\u{fe0f}"),
    ("bookmark_tabs", "\u{1f4d1}"),
    ("bookmark", "\u{1f516}"),
    ("label", "\u{1f3f7}\u{fe0f}"),
    ("moneybag", "\u{1f4b0}"),
    ("yen", "\u{1f4b4}"),
    ("dollar", "\u{1f4b5}"),
    ("euro", "\u{1f4b6}"),
    ("pound", "\u{1f4b7}"),
    ("money_with_wings", "\u{1f4b8}"),
    ("credit_card", "\u{1f4b3}"),
    ("receipt", "\u{1f9fe}"),
    ("chart", "\u{1f4b9}"),
    ("email", "\u{2709}\u{fe0f}"),
    ("envelope", "\u{2709}\u{fe0f}"),
    ("e-mail", "\u{1f4e7}"),
    ("incoming_envelope", "\u{1f4e8}"),
    ("envelope_with_arrow", "\u{1f4e9}"),
    ("outbox_tray", "\u{1f4e4}"),
    ("inbox_tray", "\u{1f4e5}"),
    ("package", "\u{1f4e6}"),
    ("mailbox", "\u{1f4eb}"),
    ("mailbox_closed", "\u{1f4ea}"),
    ("mailbox_with_mail", "\u{1f4ec}"),
    ("mailbox_with_no_mail", "\u{1f4ed}"),
    ("postbox", "\u{1f4ee}"),
    ("ballot_box", "\u{1f5f3}\u{fe0f}"),
    ("pencil2", "\u{270f}\u{fe0f}"),
    ("black_nib", "\u{2712}\u{fe0f}"),
    ("fountain_pen", "\u{1f58b}\u{fe0f}"),
    ("pen", "\u{1f58a}\u{fe0f}"),
    ("paintbrush", "\u{1f58c}\u{fe0f}"),
    ("crayon", "\u{1f58d}\u{fe0f}"),
    ("memo", "\u{1f4dd}"),
    ("pencil", "\u{1f4dd}"),
    ("briefcase", "\u{1f4bc}"),
    ("file_folder", "\u{1f4c1}"),
    ("open_file_folder", "\u{1f4c2}"),
    ("card_index_dividers", "\u{1f5c2}\u{fe0f}"),
    ("date", "\u{1f4c5}"),
    ("calendar", "\u{1f4c6}"),
    ("spiral_notepad", "\u{1f5d2}\u{fe0f}"),
    ("spiral_calendar", "\u{1f5d3}\u{fe0f}"),
    ("card_index", "\u{1f4c7}"),
    ("chart_with_upwards_trend", "\u{1f4c8}"),
    ("chart_with_downwards_trend", "\u{1f4c9}"),
    ("bar_chart", "\u{1f4ca}"),
    ("clipboard", "\u{1f4cb}"),
    ("pushpin", "\u{1f4cc}"),
    ("round_pushpin", "\u{1f4cd}"),
    ("paperclip", "\u{1f4ce}"),
    ("paperclips", "\u{1f587}\u{fe0f}"),
    ("straight_ruler", "\u{1f4cf}"),
    ("triangular_ruler", "\u{1f4d0}"),
    ("scissors", "\u{2702}\u{fe0f}"),
    ("card_file_box", "\u{1f5c3}\u{fe0f}"),
    ("file_cabinet", "\u{1f5c4}\u{fe0f}"),
    ("wastebasket", "\u{1f5d1}\u{fe0f}"),
    ("lock", "\u{1f512}"),
    ("unlock", "\u{1f513}"),
    ("lock_with_ink_pen", "\u{1f50f}"),
    ("closed_lock_with_key", "\u{1f510}"),
    ("key", "\u{1f511}"),
    ("old_key", "\u{1f5dd}\u{fe0f}"),
    ("hammer", "\u{1f528}"),
    ("axe", "\u{1fa93}"),
    ("pick", "\u{26cf}\u{fe0f}"),
    ("hammer_and_pick", "\u{2692}\u{fe0f}"),
    ("hammer_and_wrench", "\u{1f6e0}\u{fe0f}"),
    ("dagger", "\u{1f5e1}\u{fe0f}"),
    ("crossed_swords", "\u{2694}\u{fe0f}"),
    ("gun", "\u{1f52b}"),
    ("bow_and_arrow", "\u{1f3f9}"),
    ("shield", "\u{1f6e1}\u{fe0f}"),
    ("wrench", "\u{1f527}"),
    ("nut_and_bolt", "\u{1f529}"),
    ("gear", "\u{2699}\u{fe0f}"),
    ("clamp", "\u{1f5dc}\u{fe0f}"),
    ("balance_scale", "\u{2696}\u{fe0f}"),
    ("probing_cane", "\u{1f9af}"),
    ("link", "\u{1f517}"),
    ("chains", "\u{26d3}\u{fe0f}"),
    ("toolbox", "\u{1f9f0}"),
    ("magnet", "\u{1f9f2}"),
    ("alembic", "\u{2697}\u{fe0f}"),
    ("test_tube", "\u{1f9ea}"),
    ("petri_dish", "\u{1f9eb}"),
    ("dna", "\u{1f9ec}"),
    ("microscope", "\u{1f52c}"),
    ("telescope", "\u{1f52d}"),
    ("satellite", "\u{1f4e1}"),
    ("syringe", "\u{1f489}"),
    ("drop_of_blood", "\u{1fa78}"),
    ("pill", "\u{1f48a}"),
    ("adhesive_bandage", "\u{1fa79}"),
    ("stethoscope", "\u{1fa7a}"),
    ("door", "\u{1f6aa}"),
    ("bed", "\u{1f6cf}\u{fe0f}"),
    ("couch_and_lamp", "\u{1f6cb}\u{fe0f}"),
    ("chair", "\u{1fa91}"),
    ("toilet", "\u{1f6bd}"),
    ("shower", "\u{1f6bf}"),
    ("bathtub", "\u{1f6c1}"),
    ("razor", "\u{1fa92}"),
    ("lotion_bottle", "\u{1f9f4}"),
    ("safety_pin", "\u{1f9f7}"),
    ("broom", "\u{1f9f9}"),
    ("basket", "\u{1f9fa}"),
    ("roll_of_paper", "\u{1f9fb}"),
    ("soap", "\u{1f9fc}"),
    ("sponge", "\u{1f9fd}"),
    ("fire_extinguisher", "\u{1f9ef}"),
    ("shopping_cart", "\u{1f6d2}"),
    ("smoking", "\u{1f6ac}"),
    ("coffin", "\u{26b0}\u{fe0f}"),
    ("funeral_urn", "\u{26b1}\u{fe0f}"),
    ("moyai", "\u{1f5ff}"),
    ("atm", "\u{1f3e7}"),
    ("put_litter_in_its_place", "\u{1f6ae}"),
    ("potable_water", "\u{1f6b0}"),
    ("wheelchair", "\u{267f}"),
    ("mens", "\u{1f6b9}"),
    ("womens", "\u{1f6ba}"),
    ("restroom", "\u{1f6bb}"),
    ("baby_symbol", "\u{1f6bc}"),
    ("wc", "\u{1f6be}"),
    ("passport_control", "\u{1f6c2}"),
    ("customs", "\u{1f6c3}"),
    ("baggage_claim", "\u{1f6c4}"),
    ("left_luggage", "\u{1f6c5}"),
    ("warning", "\u{26a0}\u{fe0f}"),
    ("children_crossing", "\u{1f6b8}"),
    ("no_entry", "\u{26d4}"),
    ("no_entry_sign", "\u{1f6ab}"),
    ("no_bicycles", "\u{1f6b3}"),
    ("no_smoking", "\u{1f6ad}"),
    ("do_not_litter", "\u{1f6af}"),
    ("non-potable_water", "\u{1f6b1}"),
    ("no_pedestrians", "\u{1f6b7}"),
    ("no_mobile_phones", "\u{1f4f5}"),
    ("underage", "\u{1f51e}"),
    ("radioactive", "\u{2622}\u{fe0f}"),
    ("biohazard", "\u{2623}\u{fe0f}"),
    ("arrow_up", "\u{2b06}\u{fe0f}"),
    ("arrow_upper_right", "\u{2197}\u{fe0f}"),
    ("arrow_right", "\u{27a1}\u{fe0f}"),
    ("arrow_lower_right", "\u{2198}\u{fe0f}"),
    ("arrow_down", "\u{2b07}\u{fe0f}"),
    ("arrow_lower_left", "\u{2199}\u{fe0f}"),
    ("arrow_left", "\u{2b05}\u{fe0f}"),
    ("arrow_upper_left", "\u{2196}\u{fe0f}"),
    ("arrow_up_down", "\u{2195}\u{fe0f}"),
    ("left_right_arrow", "\u{2194}\u{fe0f}"),
    ("leftwards_arrow_with_hook", "\u{21a9}\u{fe0f}"),
    ("arrow_right_hook", "\u{21aa}\u{fe0f}"),
    ("arrow_heading_up", "\u{2934}\u{fe0f}"),
    ("arrow_heading_down", "\u{2935}\u{fe0f}"),
    ("arrows_clockwise", "\u{1f503}"),
    ("arrows_counterclockwise", "\u{1f504}"),
    ("back", "\u{1f519}"),
    ("end", "\u{1f51a}"),
    ("on", "\u{1f51b}"),
    ("soon", "\u{1f51c}"),
    ("top", "\u{1f51d}"),
    ("place_of_worship", "\u{1f6d0}"),
    ("atom_symbol", "\u{269b}\u{fe0f}"),
    ("om", "\u{1f549}\u{fe0f}"),
    ("star_of_david", "\u{2721}\u{fe0f}"),
    ("wheel_of_dharma", "\u{2638}\u{fe0f}"),
    ("yin_yang", "\u{262f}\u{fe0f}"),
    ("latin_cross", "\u{271d}\u{fe0f}"),
    ("orthodox_cross", "\u{2626}\u{fe0f}"),
    ("star_and_crescent", "\u{262a}\u{fe0f}"),
    ("peace_symbol", "\u{262e}\u{fe0f}"),
    ("menorah", "\u{1f54e}"),
    ("six_pointed_star", "\u{1f52f}"),
    ("aries", "\u{2648}"),
    ("taurus", "\u{2649}"),
    ("gemini", "\u{264a}"),
    ("cancer", "\u{264b}"),
    ("leo", "\u{264c}"),
    ("virgo", "\u{264d}"),
    ("libra", "\u{264e}"),
    ("scorpius", "\u{264f}"),
    ("sagittarius", "\u{2650}"),
    ("capricorn", "\u{2651}"),
    ("aquarius", "\u{2652}"),
    ("pisces", "\u{2653}"),
    ("ophiuchus", "\u{26ce}"),
    ("twisted_rightwards_arrows", "\u{1f500}"),
    ("repeat", "\u{1f501}"),
    ("repeat_one", "\u{1f502}"),
    ("arrow_forward", "\u{25b6}\u{fe0f}"),
    ("fast_forward", "\u{23e9}"),
    ("next_track_button", "\u{23ed}\u{fe0f}"),
    ("play_or_pause_button", "\u{23ef}\u{fe0f}"),
    ("arrow_backward", "\u{25c0}\u{fe0f}"),
    ("rewind", "\u{23ea}"),
    ("previous_track_button", "\u{23ee}\u{fe0f}"),
    ("arrow_up_small", "\u{1f53c}"),
    ("arrow_double_up", "\u{23eb}"),
    ("arrow_down_small", "\u{1f53d}"),
    ("arrow_double_down", "\u{23ec}"),
    ("pause_button", "\u{23f8}\u{fe0f}"),
    ("stop_button", "\u{23f9}\u{fe0f}"),
    ("record_button", "\u{23fa}\u{fe0f}"),
    ("eject_button", "\u{23cf}\u{fe0f}"),
    ("cinema", "\u{1f3a6}"),
    ("low_brightness", "\u{1f505}"),
    ("high_brightness", "\u{1f506}"),
    ("signal_strength", "\u{1f4f6}"),
    ("vibration_mode", "\u{1f4f3}"),
    ("mobile_phone_off", "\u{1f4f4}"),
    ("female_sign", "\u{2640}\u{fe0f}"),
    ("male_sign", "\u{2642}\u{fe0f}"),
    ("infinity", "\u{267e}\u{fe0f}"),
    ("heavy_multiplication_x", "\u{2716}\u{fe0f}"),
    ("heavy_plus_sign", "\u{2795}"),
    ("heavy_minus_sign", "\u{2796}"),
    ("heavy_division_sign", "\u{2797}"),
    ("bangbang", "\u{203c}\u{fe0f}"),
    ("interrobang", "\u{2049}\u{fe0f}"),
    ("question", "\u{2753}"),
    ("grey_question", "\u{2754}"),
    ("grey_exclamation", "\u{2755}"),
    ("exclamation", "\u{2757}"),
    ("heavy_exclamation_mark", "\u{2757}"),
    ("wavy_dash", "\u{3030}\u{fe0f}"),
    ("currency_exchange", "\u{1f4b1}"),
    ("heavy_dollar_sign", "\u{1f4b2}"),
    ("medical_symbol", "\u{2695}\u{fe0f}"),
    ("recycle", "\u{267b}\u{fe0f}"),
    ("fleur_de_lis", "\u{269c}\u{fe0f}"),
    ("trident", "\u{1f531}"),
    ("name_badge", "\u{1f4db}"),
    ("beginner", "\u{1f530}"),
    ("o", "\u{2b55}"),
    ("white_check_mark", "\u{2705}"),
    ("ballot_box_with_check", "\u{2611}\u{fe0f}"),
    ("heavy_check_mark", "\u{2714}\u{fe0f}"),
    ("x", "\u{274c}"),
    ("negative_squared_cross_mark", "\u{274e}"),
    ("curly_loop", "\u{27b0}"),
    ("loop", "\u{27bf}"),
    ("part_alternation_mark", "\u{303d}\u{fe0f}"),
    ("eight_spoked_asterisk", "\u{2733}\u{fe0f}"),
    ("eight_pointed_black_star", "\u{2734}\u{fe0f}"),
    ("sparkle", "\u{2747}\u{fe0f}"),
    ("copyright", "\u{a9}\u{fe0f}"),
    ("registered", "\u{ae}\u{fe0f}"),
    ("tm", "\u{2122}\u{fe0f}"),
    ("hash", "\u{23}\u{fe0f}\u{20e3}"),
    ("asterisk", "\u{2a}\u{fe0f}\u{20e3}"),
    ("zero", "\u{30}\u{fe0f}\u{20e3}"),
    ("one", "\u{31}\u{fe0f}\u{20e3}"),
    ("two", "\u{32}\u{fe0f}\u{20e3}"),
    ("three", "\u{33}\u{fe0f}\u{20e3}"),
    ("four", "\u{34}\u{fe0f}\u{20e3}"),
    ("five", "\u{35}\u{fe0f}\u{20e3}"),
    ("six", "\u{36}\u{fe0f}\u{20e3}"),
    ("seven", "\u{37}\u{fe0f}\u{20e3}"),
    ("eight", "\u{38}\u{fe0f}\u{20e3}"),
    ("nine", "\u{39}\u{fe0f}\u{20e3}"),
    ("keycap_ten", "\u{1f51f}"),
    ("capital_abcd", "\u{1f520}"),
    ("abcd", "\u{1f521}"),
    ("1234", "\u{1f522}"),
    ("symbols", "\u{1f523}"),
    ("abc", "\u{1f524}"),
    ("a", "\u{1f170}\u{fe0f}"),
    ("ab", "\u{1f18e}"),
    ("b", "\u{1f171}\u{fe0f}"),
    ("cl", "\u{1f191}"),
    ("cool", "\u{1f192}"),
    ("free", "\u{1f193}"),
    ("information_source", "\u{2139}\u{fe0f}"),
    ("id", "\u{1f194}"),
    ("m", "\u{24c2}\u{fe0f}"),
    ("new", "\u{1f195}"),
    ("ng", "\u{1f196}"),
    ("o2", "\u{1f17e}\u{fe0f}"),
    ("ok", "\u{1f197}"),
    ("parking", "\u{1f17f}\u{fe0f}"),
    ("sos", "\u{1f198}"),
    ("up", "\u{1f199}"),
    ("vs", "\u{1f19a}"),
    ("koko", "\u{1f201}"),
    ("sa", "\u{1f202}\u{fe0f}"),
    ("red_circle", "\u{1f534}"),
    ("orange_circle", "\u{1f7e0}"),
    ("yellow_circle", "\u{1f7e1}"),
    ("green_circle", "\u{1f7e2}"),
    ("large_blue_circle", "\u{1f535}"),
    ("purple_circle", "\u{1f7e3}"),
    ("brown_circle", "\u{1f7e4}"),
    ("black_circle", "\u{26ab}"),
    ("white_circle", "\u{26aa}"),
    ("red_square", "\u{1f7e5}"),
    ("orange_square", "\u{1f7e7}"),
    ("yellow_square", "\u{1f7e8}"),
    ("green_square", "\u{1f7e9}"),
    ("blue_square", "\u{1f7e6}"),
    ("purple_square", "\u{1f7ea}"),
    ("brown_square", "\u{1f7eb}"),
    ("black_large_square", "\u{2b1b}"),
    ("white_large_square", "\u{2b1c}"),
    ("black_medium_square", "\u{25fc}\u{fe0f}"),
    ("white_medium_square", "\u{25fb}\u{fe0f}"),
    ("black_medium_small_square", "\u{25fe}"),
    ("white_medium_small_square", "\u{25fd}"),
    ("black_small_square", "\u{25aa}\u{fe0f}"),
    ("white_small_square", "\u{25ab}\u{fe0f}"),
    ("large_orange_diamond", "\u{1f536}"),
    ("large_blue_diamond", "\u{1f537}"),
    ("small_orange_diamond", "\u{1f538}"),
    ("small_blue_diamond", "\u{1f539}"),
    ("small_red_triangle", "\u{1f53a}"),
    ("small_red_triangle_down", "\u{1f53b}"),
    ("diamond_shape_with_a_dot_inside", "\u{1f4a0}"),
    ("radio_button", "\u{1f518}"),
    ("white_square_button", "\u{1f533}"),
    ("black_square_button", "\u{1f532}"),
    ("checkered_flag", "\u{1f3c1}"),
    ("triangular_flag_on_post", "\u{1f6a9}"),
    ("crossed_flags", "\u{1f38c}"),
    ("black_flag", "\u{1f3f4}"),
    ("white_flag", "\u{1f3f3}\u{fe0f}"),
    ("rainbow_flag", "\u{1f3f3}\u{fe0f}\u{200d}\u{1f308}"),
    ("pirate_flag", "\u{1f3f4}\u{200d}\u{2620}\u{fe0f}"),
];
